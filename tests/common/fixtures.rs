// Test fixtures for integration testing

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test repository fixture for creating synthetic test data
#[allow(dead_code)] // Used in integration tests
pub struct TestRepo {
    pub dir: TempDir,
    pub files: Vec<PathBuf>,
}

impl TestRepo {
    /// Create a small test repository (8 files)
    #[allow(dead_code)] // Used in integration tests
    pub fn small() -> Self {
        Self::with_files(&[
            (
                "src/auth.rs",
                "/// Checks a user's password against the stored auth hash\n\
                 pub fn authenticate(user: &str, password: &str) -> bool {\n    \
                 verify_auth_hash(user, password)\n}\n",
            ),
            (
                "src/db.rs",
                "/// Opens the database connection pool\n\
                 pub fn connect(url: &str) -> Pool {\n    Pool::open(url)\n}\n",
            ),
            (
                "src/render.rs",
                "/// Renders a page template to HTML\n\
                 pub fn render(template: &Template) -> String {\n    template.to_html()\n}\n",
            ),
            (
                "src/parse.rs",
                "/// Parses the request body as JSON\n\
                 pub fn parse(body: &[u8]) -> Value {\n    serde_json::from_slice(body).unwrap()\n}\n",
            ),
            ("README.md", "# Demo\n\nA small service used to test retrieval.\n"),
            (
                "Cargo.toml",
                "[package]\nname = \"demo\"\nversion = \"0.1.0\"\n",
            ),
            ("LICENSE", "MIT License\n\nCopyright (c) 2025\n"),
            ("target/debug/ignored.rs", "fn ignored() {}\n"),
        ])
    }

    /// Create with custom files
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().unwrap();
        let mut paths = Vec::new();

        for (path, content) in files {
            let full_path = dir.path().join(path);
            std::fs::create_dir_all(full_path.parent().unwrap()).unwrap();
            std::fs::write(&full_path, content).unwrap();
            paths.push(full_path);
        }

        Self { dir, files: paths }
    }

    /// Overwrite (or create) one file
    #[allow(dead_code)] // Used in integration tests
    pub fn write(&self, relative: &str, content: &str) {
        let full_path = self.dir.path().join(relative);
        std::fs::create_dir_all(full_path.parent().unwrap()).unwrap();
        std::fs::write(full_path, content).unwrap();
    }

    /// Get path to the repository
    #[allow(dead_code)] // Used in integration tests
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// UTF-8 test data for chunker safety tests
#[allow(dead_code)] // Used in integration tests
pub struct Utf8TestData {
    pub emoji: Vec<&'static str>,
    pub multibyte: Vec<&'static str>,
    pub mixed: Vec<&'static str>,
}

impl Utf8TestData {
    #[allow(dead_code)] // Used in integration tests
    pub fn new() -> Self {
        Self {
            emoji: vec![
                "Hello 👋 World",
                "Rust 🦀 is awesome",
                "🚀 Launch time",
                "Celebrate 🎉🎊🥳",
            ],
            multibyte: vec![
                "中文测试",
                "مرحبا بالعالم",
                "Привет мир",
                "こんにちは世界",
                "안녕하세요 세계",
            ],
            mixed: vec![
                "fn main() { // 🚀 Entry point",
                "// 中文注释 in Rust code",
                "/* שלום */ pub fn test() {}",
                "const MSG: &str = \"🎉 Success!\";",
            ],
        }
    }

    /// Every sample, in a fixed order
    #[allow(dead_code)] // Used in integration tests
    pub fn all(&self) -> Vec<&'static str> {
        self.emoji
            .iter()
            .chain(&self.multibyte)
            .chain(&self.mixed)
            .copied()
            .collect()
    }
}

impl Default for Utf8TestData {
    fn default() -> Self {
        Self::new()
    }
}
