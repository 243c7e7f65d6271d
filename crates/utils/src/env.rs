// Copyright 2024 Irreducible Inc.

/// Whether the environment variable `flag` holds a truthy value such as `1`, `on` or `true`.
pub fn boolean_env_flag_set(flag: &str) -> bool {
	std::env::var(flag).is_ok_and(|val| {
		matches!(val.to_ascii_lowercase().as_str(), "1" | "on" | "true" | "yes")
	})
}
