// Utility to compare secrets in constant time

/// Compares 2 strings without short-circuiting on the first
/// differing byte, so the comparison time only depends on the length
///
/// # Arguments
///
/// * `a` - First string
/// * `b` - Second string
///
/// # Return value
///
/// Returns true if the 2 strings are equal, false otherwise
pub fn string_compare_constant_time(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_compare_constant_time() {
        let marker = "9f86d081884c7d659a2feaa0c55ad015";

        assert!(string_compare_constant_time(marker, marker));
        assert!(string_compare_constant_time("", ""));

        assert!(!string_compare_constant_time(marker, ""));
        assert!(!string_compare_constant_time(
            marker,
            "9f86d081884c7d659a2feaa0c55ad016"
        ));
        assert!(!string_compare_constant_time(
            marker,
            "0f86d081884c7d659a2feaa0c55ad015"
        ));
        assert!(!string_compare_constant_time(marker, "9f86d081"));
    }
}
