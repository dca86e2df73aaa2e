use std::collections::HashMap;

/// Maps file extensions (and a few well-known bare filenames) to the
/// language tag used for Markdown code fences and sidecar metadata.
#[derive(Debug)]
pub struct LanguageRegistry {
    extension_map: HashMap<&'static str, &'static str>,
    filename_map: HashMap<&'static str, &'static str>,
}

impl LanguageRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            extension_map: HashMap::new(),
            filename_map: HashMap::new(),
        }
    }

    pub fn register(&mut self, tag: &'static str, extensions: &[&'static str]) {
        for ext in extensions {
            self.extension_map.insert(ext, tag);
        }
    }

    pub fn register_filename(&mut self, tag: &'static str, filenames: &[&'static str]) {
        for name in filenames {
            self.filename_map.insert(name, tag);
        }
    }

    /// Detect the language tag for a forward-slash relative path.
    /// Returns an empty string when the extension is unknown.
    #[must_use]
    pub fn detect(&self, path: &str) -> &'static str {
        let filename = path.rsplit('/').next().unwrap_or(path);
        if let Some(tag) = self.filename_map.get(filename) {
            return tag;
        }
        let ext = filename
            .rsplit_once('.')
            .map(|(_, e)| e.to_ascii_lowercase())
            .unwrap_or_default();
        self.extension_map.get(ext.as_str()).copied().unwrap_or("")
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        let mut registry = Self::new();

        registry.register("rust", &["rs"]);
        registry.register("go", &["go"]);
        registry.register("python", &["py", "pyi"]);
        registry.register("javascript", &["js", "mjs", "cjs", "jsx"]);
        registry.register("typescript", &["ts", "mts", "cts", "tsx"]);
        registry.register("java", &["java"]);
        registry.register("kotlin", &["kt", "kts"]);
        registry.register("c", &["c", "h"]);
        registry.register("cpp", &["cpp", "cc", "cxx", "hpp", "hxx"]);
        registry.register("csharp", &["cs"]);
        registry.register("ruby", &["rb"]);
        registry.register("php", &["php"]);
        registry.register("swift", &["swift"]);
        registry.register("scala", &["scala"]);
        registry.register("bash", &["sh", "bash"]);
        registry.register("markdown", &["md", "markdown"]);
        registry.register("toml", &["toml"]);
        registry.register("yaml", &["yaml", "yml"]);
        registry.register("json", &["json"]);
        registry.register("xml", &["xml"]);
        registry.register("html", &["html", "htm"]);
        registry.register("css", &["css", "scss"]);
        registry.register("sql", &["sql"]);
        registry.register("proto", &["proto"]);
        registry.register("lua", &["lua"]);
        registry.register("zig", &["zig"]);

        registry.register_filename("dockerfile", &["Dockerfile"]);
        registry.register_filename("makefile", &["Makefile", "GNUmakefile"]);

        registry
    }
}
