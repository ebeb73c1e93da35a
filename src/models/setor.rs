use serde::{Deserialize, Serialize};

/// Organizational department. Scopes task visibility for non-admin users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setor {
    pub id: String,
    pub nome: String,
    /// Hex color (`#rrggbb`), used by dashboards consuming the export.
    pub cor: String,
    pub ativo: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// `#` followed by exactly six hex digits.
pub fn is_valid_hex_color(s: &str) -> bool {
    let Some(hex) = s.strip_prefix('#') else {
        return false;
    };
    hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color() {
        assert!(is_valid_hex_color("#1e40af"));
        assert!(is_valid_hex_color("#FFFFFF"));
        assert!(!is_valid_hex_color("1e40af"));
        assert!(!is_valid_hex_color("#1e40a"));
        assert!(!is_valid_hex_color("#1e40ag"));
        assert!(!is_valid_hex_color(""));
    }
}
