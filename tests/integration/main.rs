//! Integration tests for picset

mod cli_tests {
    use assert_cmd::Command;
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn picset() -> Command {
        Command::cargo_bin("picset").unwrap()
    }

    /// Write a small PNG fixture the real codec can decode
    fn write_png(path: &Path, width: u32, height: u32) {
        let img = image::DynamicImage::ImageRgb8(image::ImageBuffer::from_pixel(
            width,
            height,
            image::Rgb([90u8, 120, 160]),
        ));
        img.save_with_format(path, image::ImageFormat::Png).unwrap();
    }

    /// Project config pointing all output into the temp dir
    fn write_config(dir: &TempDir) -> std::path::PathBuf {
        let config_path = dir.path().join("picset.toml");
        let output_dir = dir.path().join("dist");
        std::fs::write(
            &config_path,
            format!(
                r#"
[output]
directory = "{}"
public_prefix = "/img/"

[sizes]
densities = [1.0, 2.0]
threshold = 0.8

[[sizes.breakpoints]]
max_width = 600
image_width = 30

[[sizes.breakpoints]]
image_width = 60
"#,
                output_dir.display()
            ),
        )
        .unwrap();
        config_path
    }

    #[test]
    fn help_displays() {
        picset()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Responsive Image Set"));
    }

    #[test]
    fn version_displays() {
        picset()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("picset"));
    }

    #[test]
    fn init_creates_config() {
        let temp = TempDir::new().unwrap();

        picset()
            .args(["init", "--path"])
            .arg(temp.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Created project config"));

        let content = std::fs::read_to_string(temp.path().join("picset.toml")).unwrap();
        assert!(content.contains("[[sizes.breakpoints]]"));
    }

    #[test]
    fn init_refuses_overwrite() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("picset.toml"), "existing").unwrap();

        picset()
            .args(["init", "--path"])
            .arg(temp.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("already exists"));
    }

    #[test]
    fn generate_missing_input_fails() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(&temp);

        picset()
            .args(["--config"])
            .arg(&config_path)
            .args(["generate", "--input"])
            .arg(temp.path().join("absent.png"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Input image not found"));
    }

    #[test]
    fn generate_end_to_end() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(&temp);
        let input = temp.path().join("input.png");
        write_png(&input, 64, 48);
        let manifest = temp.path().join("manifest.json");

        picset()
            .args(["--config"])
            .arg(&config_path)
            .args(["generate", "--input"])
            .arg(&input)
            .args(["--manifest"])
            .arg(&manifest)
            .assert()
            .success()
            .stdout(predicate::str::contains("Wrote manifest"));

        let body = std::fs::read_to_string(&manifest).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(parsed.get("aspect").is_some());
        assert!(parsed.get("img").is_some());

        // The transform cache was persisted next to the assets
        assert!(temp.path().join("dist").join("picset-cache.json").exists());
    }

    #[test]
    fn generate_twice_reuses_cache() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(&temp);
        let input = temp.path().join("input.png");
        write_png(&input, 64, 48);

        for _ in 0..2 {
            picset()
                .args(["--config"])
                .arg(&config_path)
                .args(["generate", "--input"])
                .arg(&input)
                .assert()
                .success();
        }

        picset()
            .args(["--config"])
            .arg(&config_path)
            .args(["cache", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("entries"));
    }

    #[test]
    fn cache_show_empty() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(&temp);

        picset()
            .args(["--config"])
            .arg(&config_path)
            .args(["cache", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Cache is empty"));
    }

    #[test]
    fn cache_clear_with_yes() {
        let temp = TempDir::new().unwrap();
        let config_path = write_config(&temp);
        let input = temp.path().join("input.png");
        write_png(&input, 64, 48);

        picset()
            .args(["--config"])
            .arg(&config_path)
            .args(["generate", "--input"])
            .arg(&input)
            .assert()
            .success();

        picset()
            .args(["--config"])
            .arg(&config_path)
            .args(["cache", "clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Cleared cache"));

        assert!(!temp.path().join("dist").join("picset-cache.json").exists());
    }

    #[test]
    fn completions_generate() {
        picset()
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("picset"));
    }
}
