/// The global `--limit` when set and non-zero, else `fallback`.
#[must_use]
pub fn effective_limit(global: Option<u32>, fallback: u32) -> u32 {
    global.filter(|limit| *limit > 0).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::effective_limit;

    #[test]
    fn global_flag_wins() {
        assert_eq!(effective_limit(Some(10), 50), 10);
    }

    #[test]
    fn zero_and_missing_fall_back() {
        assert_eq!(effective_limit(Some(0), 50), 50);
        assert_eq!(effective_limit(None, 50), 50);
    }
}
