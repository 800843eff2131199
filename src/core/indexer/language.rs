//! Extension to language lookup.
//!
//! Both tables are plain data so new formats can be added without
//! touching control flow. Keys are lowercase.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::Path;

/// Fallback language tag for unrecognized files
pub const PLAIN_TEXT: &str = "text";

const EXTENSIONS: &[(&str, &str)] = &[
    ("rs", "rust"),
    ("cs", "csharp"),
    ("csx", "csharp"),
    ("fs", "fsharp"),
    ("vb", "vbnet"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("js", "javascript"),
    ("jsx", "javascript"),
    ("mjs", "javascript"),
    ("cjs", "javascript"),
    ("py", "python"),
    ("go", "go"),
    ("java", "java"),
    ("kt", "kotlin"),
    ("kts", "kotlin"),
    ("scala", "scala"),
    ("swift", "swift"),
    ("c", "c"),
    ("h", "c"),
    ("cpp", "cpp"),
    ("cc", "cpp"),
    ("cxx", "cpp"),
    ("hpp", "cpp"),
    ("rb", "ruby"),
    ("php", "php"),
    ("lua", "lua"),
    ("dart", "dart"),
    ("sql", "sql"),
    ("sh", "shell"),
    ("bash", "shell"),
    ("zsh", "shell"),
    ("ps1", "powershell"),
    ("html", "html"),
    ("htm", "html"),
    ("razor", "razor"),
    ("cshtml", "razor"),
    ("css", "css"),
    ("scss", "scss"),
    ("md", "markdown"),
    ("markdown", "markdown"),
    ("txt", "text"),
    ("json", "json"),
    ("jsonc", "json"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
    ("toml", "toml"),
    ("xml", "xml"),
    ("xaml", "xml"),
    ("csproj", "xml"),
    ("fsproj", "xml"),
    ("vbproj", "xml"),
    ("props", "xml"),
    ("targets", "xml"),
    ("resx", "xml"),
    ("config", "xml"),
    ("sln", "solution"),
    ("ini", "ini"),
    ("editorconfig", "ini"),
    ("lock", "lockfile"),
];

/// Extensions whose content is manifest, solution or config shaped
const STRUCTURED_EXTENSIONS: &[&str] = &[
    "json", "jsonc", "yaml", "yml", "toml", "xml", "csproj", "fsproj", "vbproj", "props",
    "targets", "resx", "config", "sln", "ini", "lock",
];

/// Files commonly referred to by name alone
const WELL_KNOWN_FILES: &[(&str, &str)] = &[
    ("makefile", "make"),
    ("dockerfile", "dockerfile"),
    ("jenkinsfile", "groovy"),
    ("rakefile", "ruby"),
    ("gemfile", "ruby"),
    ("procfile", "text"),
    ("readme", "markdown"),
    ("license", "text"),
    ("licence", "text"),
    ("notice", "text"),
    ("copying", "text"),
    ("changelog", "markdown"),
    ("cargo.toml", "toml"),
    ("package.json", "json"),
    ("go.mod", "go"),
    ("build.gradle", "groovy"),
    ("cmakelists.txt", "cmake"),
    ("directory.build.props", "xml"),
    ("global.json", "json"),
];

/// Name stems that mark license/notice files
const LICENSE_STEMS: &[&str] = &["license", "licence", "notice", "copying", "third-party-notices"];

static EXTENSION_MAP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| EXTENSIONS.iter().copied().collect());

static WELL_KNOWN_MAP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| WELL_KNOWN_FILES.iter().copied().collect());

/// Lowercase extension of a path, without the dot
pub fn extension_of(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn file_name_of(path: &str) -> String {
    path.rsplit(['/', '\\'])
        .next()
        .unwrap_or(path)
        .to_ascii_lowercase()
}

/// Language tag for a path, falling back to [`PLAIN_TEXT`]
pub fn language_for_path(path: &str) -> &'static str {
    let name = file_name_of(path);
    if let Some(&lang) = WELL_KNOWN_MAP.get(name.as_str()) {
        return lang;
    }
    extension_of(path)
        .and_then(|ext| EXTENSION_MAP.get(ext.as_str()).copied())
        .unwrap_or(PLAIN_TEXT)
}

/// Whether an extension is in the language table
pub fn is_known_extension(ext: &str) -> bool {
    EXTENSION_MAP.contains_key(ext.to_ascii_lowercase().as_str())
}

/// Whether an extension names a manifest/solution/config format
pub fn is_structured_extension(ext: &str) -> bool {
    let ext = ext.to_ascii_lowercase();
    STRUCTURED_EXTENSIONS.contains(&ext.as_str())
}

/// Whether a bare file name (no directories) is well known
pub fn is_well_known_file(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    if WELL_KNOWN_MAP.contains_key(lower.as_str()) {
        return true;
    }
    // README.md, LICENSE.txt and friends
    Path::new(&lower)
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|stem| WELL_KNOWN_MAP.contains_key(stem))
        .unwrap_or(false)
}

/// Whether a path names a license or notice file
pub fn is_license_file(path: &str) -> bool {
    let name = file_name_of(path);
    let stem = Path::new(&name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(&name);
    LICENSE_STEMS
        .iter()
        .any(|s| stem == *s || stem.starts_with(&format!("{s}-")))
}
