#[cfg(test)]
mod cli {
    use assert_cmd::cargo::cargo_bin_cmd;
    use predicates::str::contains;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use std::{error::Error, fs, path::Path};
    use tempfile::tempdir;
    use test_utils::list_server;

    type Result<T> = std::result::Result<T, Box<dyn Error>>;

    /// Write a dataset which selects `/hosts.txt` and `/easylist.txt` on
    /// `base` and ignores `/ignored.txt`
    fn write_dataset(dir: &Path, base: &str) -> Result<()> {
        let csv = format!(
            "id,tagIds,primaryViewUrl\n\
             1,\"[2, 5]\",{base}/hosts.txt\n\
             2,[7],{base}/ignored.txt\n\
             3,\"[3,9]\",{base}/easylist.txt\n\
             4,[6],ftp://example.com/list.txt\n"
        );
        fs::write(dir.join("data.csv"), csv)?;
        Ok(())
    }

    fn url_filters(rules: &Value) -> Vec<String> {
        rules
            .as_array()
            .unwrap()
            .iter()
            .map(|rule| rule["condition"]["urlFilter"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_generate_writes_rules() -> Result<()> {
        let server = list_server!(
            ("/hosts.txt", "0.0.0.0 ads.example.com\n127.0.0.1 localhost"),
            ("/easylist.txt", "! comment\n||track.example.org^"),
            ("/ignored.txt", "||ignored.example.net^"),
        );
        let dir = tempdir()?;
        write_dataset(dir.path(), &server.uri())?;

        cargo_bin_cmd!("shieldgen")
            .current_dir(dir.path())
            .arg("--dataset")
            .arg("data.csv")
            .arg("--output")
            .arg("out/nested/rules.json")
            .assert()
            .success()
            .stdout(contains("Generated 2 rules -> out/nested/rules.json"));

        let rules: Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("out/nested/rules.json"))?)?;
        let ids: Vec<u64> = rules
            .as_array()
            .unwrap()
            .iter()
            .map(|rule| rule["id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![2000, 2001]);

        let mut filters = url_filters(&rules);
        filters.sort();
        assert_eq!(filters, vec!["ads.example.com", "track.example.org"]);

        assert_eq!(rules[0]["priority"], 1);
        assert_eq!(rules[0]["action"]["type"], "block");
        assert_eq!(
            rules[0]["condition"]["resourceTypes"],
            serde_json::json!(["script", "image", "xmlhttprequest", "sub_frame"])
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_generate_limit_and_interest() -> Result<()> {
        let server = list_server!(("/ignored.txt", "||c.example.net^\n||b.example.net^"));
        let dir = tempdir()?;
        write_dataset(dir.path(), &server.uri())?;

        cargo_bin_cmd!("shieldgen")
            .current_dir(dir.path())
            .args(["generate", "--dataset", "data.csv", "--output", "rules.json"])
            .args(["--interest", "7", "--limit", "1"])
            .assert()
            .success();

        let rules: Value = serde_json::from_str(&fs::read_to_string(dir.path().join("rules.json"))?)?;
        assert_eq!(url_filters(&rules), vec!["b.example.net"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_unreachable_lists_yield_empty_rules() -> Result<()> {
        let dir = tempdir()?;
        // Nothing listens on port 1
        write_dataset(dir.path(), "http://127.0.0.1:1")?;

        cargo_bin_cmd!("shieldgen")
            .current_dir(dir.path())
            .args(["--dataset", "data.csv", "--output", "rules.json"])
            .assert()
            .success()
            .stdout(contains("Generated 0 rules"));

        assert_eq!(fs::read_to_string(dir.path().join("rules.json"))?, "[]");
        Ok(())
    }

    #[test]
    fn test_missing_dataset() -> Result<()> {
        let dir = tempdir()?;

        cargo_bin_cmd!("shieldgen")
            .current_dir(dir.path())
            .args(["--dataset", "does-not-exist.csv"])
            .assert()
            .failure()
            .code(1)
            .stderr(contains("Cannot load dataset from `does-not-exist.csv`"));

        assert!(!dir.path().join("rules").exists());
        Ok(())
    }

    #[test]
    fn test_invalid_config_file() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("custom.toml"), "limit = \"many\"")?;

        cargo_bin_cmd!("shieldgen")
            .current_dir(dir.path())
            .args(["--config", "custom.toml"])
            .assert()
            .failure()
            .code(3)
            .stderr(contains("Cannot load configuration file `custom.toml`"));
        Ok(())
    }

    #[test]
    fn test_missing_explicit_config_file() -> Result<()> {
        let dir = tempdir()?;

        cargo_bin_cmd!("shieldgen")
            .current_dir(dir.path())
            .args(["--config", "missing.toml"])
            .assert()
            .failure()
            .code(3);
        Ok(())
    }

    #[tokio::test]
    async fn test_default_config_file() -> Result<()> {
        let server = list_server!(("/hosts.txt", "0.0.0.0 b.example.com\n0.0.0.0 a.example.com"));
        let dir = tempdir()?;
        write_dataset(dir.path(), &server.uri())?;
        fs::write(
            dir.path().join("shieldgen.toml"),
            "dataset = \"data.csv\"\noutput = \"from-config.json\"\nlimit = 1\ninterest = [2]\n",
        )?;

        cargo_bin_cmd!("shieldgen")
            .current_dir(dir.path())
            .assert()
            .success()
            .stdout(contains("Generated 1 rules -> from-config.json"));

        let rules: Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("from-config.json"))?)?;
        assert_eq!(url_filters(&rules), vec!["a.example.com"]);
        Ok(())
    }

    #[test]
    fn test_help() {
        cargo_bin_cmd!("shieldgen")
            .arg("--help")
            .assert()
            .success()
            .stdout(contains("Usage: shieldgen"))
            .stdout(contains("serve"));
    }
}
