//! Canonical reason phrases for status codes.

/// The reason phrase for `status`.
///
/// Only a handful of codes are known; anything else gets a synthesized
/// `"<status> Message"` phrase.
pub fn reason_for(status: u16) -> String {
    match status {
        200 => "OK".to_string(),
        400 => "Bad Request".to_string(),
        404 => "Not Found".to_string(),
        500 => "Server Error".to_string(),
        other => format!("{other} Message"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes() {
        assert_eq!(reason_for(200), "OK");
        assert_eq!(reason_for(400), "Bad Request");
        assert_eq!(reason_for(404), "Not Found");
        assert_eq!(reason_for(500), "Server Error");
    }

    #[test]
    fn unknown_code_is_synthesized() {
        assert_eq!(reason_for(418), "418 Message");
        assert_eq!(reason_for(0), "0 Message");
    }
}
