//! Shared test fixtures

use crate::handler::ContentRoot;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Throwaway content root holding `index.html` ("Hello World!") and `404.html` ("Not Found")
pub struct TestRoot {
    dir: PathBuf,
}

impl TestRoot {
    pub fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("cihttp-{}-{name}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let root = Self { dir };
        root.write("index.html", "Hello World!");
        root.write("404.html", "Not Found");
        root
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn content(&self) -> ContentRoot {
        ContentRoot::new(&self.dir, "404.html")
    }

    pub fn write(&self, name: &str, contents: &str) {
        let path = self.dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }

    pub fn set_modified(&self, name: &str, time: SystemTime) {
        let file = std::fs::File::options()
            .write(true)
            .open(self.dir.join(name))
            .unwrap();
        file.set_modified(time).unwrap();
    }
}

impl Drop for TestRoot {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}
