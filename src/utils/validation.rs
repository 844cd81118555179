//! Input validation utilities

use crate::constants;

/// Validate that the compile and run programs understand `language`
pub fn validate_language(language: &str) -> Result<(), String> {
    if constants::languages::ALL.contains(&language) {
        Ok(())
    } else {
        Err(format!(
            "Unsupported language: {language}. Supported languages: {:?}",
            constants::languages::ALL
        ))
    }
}

/// Validate a contest duration in minutes
pub fn validate_duration_minutes(minutes: i32) -> Result<(), &'static str> {
    if minutes <= 0 {
        return Err("Contest duration must be positive");
    }
    Ok(())
}

/// Validate a problem's display number
pub fn validate_problem_number(number: i32) -> Result<(), &'static str> {
    if number <= 0 {
        return Err("Problem number must be positive");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_language() {
        assert!(validate_language("py").is_ok());
        assert!(validate_language("kt").is_ok());
        assert!(validate_language("cpp").is_ok());
        assert!(validate_language("rust").is_err());
        assert!(validate_language("").is_err());
    }

    #[test]
    fn test_positive_numbers() {
        assert!(validate_duration_minutes(1).is_ok());
        assert!(validate_duration_minutes(0).is_err());
        assert!(validate_problem_number(-3).is_err());
    }
}
