/*
This file is part of the GIS Address Server
Copyright (C) 2023 Novel-T

The GIS Address Server is free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with this program.  If not, see <http://www.gnu.org/licenses/>.
*/
use std::collections::HashMap;
use std::path::Path;

pub const ENV_FILE_NAME: &str = ".env";
pub const API_KEY_NAME: &str = "API_KEY";

/// Parse a `.env` style file of KEY=value lines. A missing file is just an
/// empty environment, lines without a `=` are ignored.
pub fn load_env(path: &Path) -> HashMap<String, String> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return HashMap::new(),
    };

    contents
        .lines()
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            Some((key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

/// The configured API key, when the working directory carries one. No key
/// means authentication is disabled.
pub fn api_key() -> Option<String> {
    load_env(Path::new(ENV_FILE_NAME)).remove(API_KEY_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "API_KEY=sekrit\nbad line\nOTHER = spaced\n").unwrap();

        let env = load_env(&path);
        assert_eq!(env.get("API_KEY").map(String::as_str), Some("sekrit"));
        assert_eq!(env.get("OTHER").map(String::as_str), Some("spaced"));
        assert_eq!(env.len(), 2);
    }

    #[test]
    fn test_missing_env_file_is_empty() {
        assert!(load_env(Path::new("/definitely/not/here/.env")).is_empty());
    }
}
