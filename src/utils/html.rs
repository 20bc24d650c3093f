// src/utils/html.rs

/// Validator for plain-text fields: anything the HTML tokenizer reads as markup
/// (tags, comments, doctypes) is rejected. Stray `&` and `<` in prose are fine
/// and are stored as typed; escaping is the client's job.
pub fn validate_plain_text(input: &str) -> Result<(), validator::ValidationError> {
    if ammonia::is_html(input) {
        return Err(validator::ValidationError::new("markup")
            .with_message("Must be plain text without HTML markup".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prose_with_special_characters_is_plain_text() {
        assert!(validate_plain_text("Bike & bus to school").is_ok());
        assert!(validate_plain_text("Use 2 < 3 cars").is_ok());
        assert!(validate_plain_text("Take shorter showers").is_ok());
    }

    #[test]
    fn tags_are_rejected() {
        assert!(validate_plain_text("Plant a tree<script>alert(1)</script>").is_err());
        assert!(validate_plain_text(r#"<b onclick="steal()">Recycle</b>"#).is_err());
    }
}
