use crate::utils::error::{DeckError, Result};
use std::net::SocketAddr;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(DeckError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(DeckError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_json_path(field_name: &str, path: &str) -> Result<()> {
    validate_path(field_name, path)?;

    match std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(()),
        _ => Err(DeckError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Deck files must have a .json extension".to_string(),
        }),
    }
}

pub fn validate_bind_address(field_name: &str, addr: &str) -> Result<SocketAddr> {
    addr.parse::<SocketAddr>()
        .map_err(|e| DeckError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: addr.to_string(),
            reason: format!("Invalid socket address: {}", e),
        })
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(DeckError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("paths.report", "report.txt").is_ok());
        assert!(validate_path("paths.report", "").is_err());
        assert!(validate_path("paths.report", "   ").is_err());
        assert!(validate_path("paths.report", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_json_path() {
        assert!(validate_json_path("paths.default_deck", "decks/major_arcana.json").is_ok());
        assert!(validate_json_path("paths.default_deck", "decks/MAJOR.JSON").is_ok());
        assert!(validate_json_path("paths.default_deck", "decks/major_arcana.txt").is_err());
        assert!(validate_json_path("paths.default_deck", "decks/major_arcana").is_err());
    }

    #[test]
    fn test_validate_bind_address() {
        assert!(validate_bind_address("server.bind", "127.0.0.1:5000").is_ok());
        assert!(validate_bind_address("server.bind", "[::1]:8080").is_ok());
        assert!(validate_bind_address("server.bind", "localhost").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("shuffle.animation_frames", 12u32, 0, 120).is_ok());
        assert!(validate_range("shuffle.animation_frames", 500u32, 0, 120).is_err());
    }
}
