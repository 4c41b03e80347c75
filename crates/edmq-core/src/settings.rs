use serde::{Deserialize, Serialize};

///
/// UriSettings
///
/// Limits and name-resolution switches for one parse/bind run.
/// Every recursive descent is bounded by one of the depth limits.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct UriSettings {
    pub max_filter_depth: usize,
    pub max_orderby_depth: usize,
    pub max_path_segments: usize,
    pub max_select_expand_depth: usize,
    pub max_expand_depth: usize,
    pub max_expand_count: usize,
    pub enable_case_insensitive: bool,
    pub enable_unqualified_enum: bool,
}

impl UriSettings {
    pub const DEFAULT_MAX_FILTER_DEPTH: usize = 800;
    pub const DEFAULT_MAX_ORDERBY_DEPTH: usize = 800;
    pub const DEFAULT_MAX_PATH_SEGMENTS: usize = 100;
    pub const DEFAULT_MAX_SELECT_EXPAND_DEPTH: usize = 800;
    pub const DEFAULT_MAX_EXPAND_DEPTH: usize = 100;
    pub const DEFAULT_MAX_EXPAND_COUNT: usize = 100;

    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_filter_depth: Self::DEFAULT_MAX_FILTER_DEPTH,
            max_orderby_depth: Self::DEFAULT_MAX_ORDERBY_DEPTH,
            max_path_segments: Self::DEFAULT_MAX_PATH_SEGMENTS,
            max_select_expand_depth: Self::DEFAULT_MAX_SELECT_EXPAND_DEPTH,
            max_expand_depth: Self::DEFAULT_MAX_EXPAND_DEPTH,
            max_expand_count: Self::DEFAULT_MAX_EXPAND_COUNT,
            enable_case_insensitive: false,
            enable_unqualified_enum: true,
        }
    }

    #[must_use]
    pub const fn with_max_filter_depth(mut self, depth: usize) -> Self {
        self.max_filter_depth = depth;
        self
    }

    #[must_use]
    pub const fn with_max_orderby_depth(mut self, depth: usize) -> Self {
        self.max_orderby_depth = depth;
        self
    }

    #[must_use]
    pub const fn with_max_path_segments(mut self, segments: usize) -> Self {
        self.max_path_segments = segments;
        self
    }

    #[must_use]
    pub const fn with_max_select_expand_depth(mut self, depth: usize) -> Self {
        self.max_select_expand_depth = depth;
        self
    }

    #[must_use]
    pub const fn with_max_expand_depth(mut self, depth: usize) -> Self {
        self.max_expand_depth = depth;
        self
    }

    #[must_use]
    pub const fn with_max_expand_count(mut self, count: usize) -> Self {
        self.max_expand_count = count;
        self
    }

    #[must_use]
    pub const fn with_case_insensitive(mut self, enabled: bool) -> Self {
        self.enable_case_insensitive = enabled;
        self
    }

    #[must_use]
    pub const fn with_unqualified_enum(mut self, enabled: bool) -> Self {
        self.enable_unqualified_enum = enabled;
        self
    }
}

impl Default for UriSettings {
    fn default() -> Self {
        Self::new()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let settings: UriSettings =
            serde_json::from_str(r#"{ "enable_case_insensitive": true, "max_expand_depth": 3 }"#)
                .expect("partial settings should deserialize");

        assert!(settings.enable_case_insensitive);
        assert_eq!(settings.max_expand_depth, 3);
        assert_eq!(settings.max_filter_depth, UriSettings::DEFAULT_MAX_FILTER_DEPTH);
        assert!(settings.enable_unqualified_enum);
    }

    #[test]
    fn setters_chain() {
        let settings = UriSettings::new()
            .with_max_path_segments(4)
            .with_case_insensitive(true);

        assert_eq!(settings.max_path_segments, 4);
        assert!(settings.enable_case_insensitive);
        assert_eq!(settings, UriSettings {
            max_path_segments: 4,
            enable_case_insensitive: true,
            ..UriSettings::default()
        });
    }
}
