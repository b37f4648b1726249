/// Build a `mailto:` link asking course staff about an assignment.
///
/// An empty `emails` slice produces a link with no recipients, which mail
/// clients open as a blank draft with subject and body filled in.
pub fn compose_mailto(course_id: i64, assignment_name: Option<&str>, emails: &[String]) -> String {
    let subject = format!(
        "[Course {course_id}] Question about {}",
        assignment_name.unwrap_or("assignment"),
    );
    let body = [
        "Hello Professor/TA,".to_owned(),
        String::new(),
        format!(
            "I have a question about {} in course {course_id}.",
            assignment_name.unwrap_or("the assignment"),
        ),
        String::new(),
        "[Your question here]".to_owned(),
        String::new(),
        "Thanks,".to_owned(),
        "[Your Name]".to_owned(),
    ].join("\r\n");

    let to: Vec<&str> = emails.iter().map(|e| e.trim()).filter(|e| !e.is_empty()).collect();
    format!(
        "mailto:{}?subject={}&body={}",
        pct(&to.join(",")), pct(&subject), pct(&body),
    )
}

/// Percent-encoding matching JavaScript's `encodeURIComponent`.
pub fn pct(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        if b.is_ascii_alphanumeric()
            || matches!(b, b'-' | b'_' | b'.' | b'~' | b'!' | b'*' | b'\'' | b'(' | b')')
        {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_like_encode_uri_component() {
        assert_eq!(pct("a b&c=d"), "a%20b%26c%3Dd");
        assert_eq!(pct("prof@uni.edu,ta@uni.edu"), "prof%40uni.edu%2Cta%40uni.edu");
        assert_eq!(pct("(ok)!*'~"), "(ok)!*'~");
        assert_eq!(pct("é"), "%C3%A9");
        assert_eq!(pct("\r\n"), "%0D%0A");
    }

    #[test]
    fn composes_subject_body_and_recipients() {
        let link = compose_mailto(42, Some("Lab 3"), &["prof@uni.edu".into(), " ".into()]);
        assert!(link.starts_with("mailto:prof%40uni.edu?subject="));
        assert!(link.contains("subject=%5BCourse%2042%5D%20Question%20about%20Lab%203"));
        assert!(link.contains("I%20have%20a%20question%20about%20Lab%203%20in%20course%2042."));
        assert!(link.contains("Hello%20Professor%2FTA%2C%0D%0A%0D%0A"));
        assert!(!link.contains("%250D"));
    }

    #[test]
    fn falls_back_to_generic_wording_without_name_or_recipients() {
        let link = compose_mailto(7, None, &[]);
        assert!(link.starts_with("mailto:?subject=%5BCourse%207%5D%20Question%20about%20assignment&body="));
        assert!(link.contains("about%20the%20assignment%20in%20course%207"));
    }
}
