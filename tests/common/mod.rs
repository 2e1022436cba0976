#![allow(dead_code)]

pub mod temp_files {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::{SystemTime, UNIX_EPOCH};

    // Global counter and lock for thread-safe temporary file creation
    static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);
    static TEMP_LOCK: Mutex<()> = Mutex::new(());

    /// Creates a temporary rule file with a unique name
    pub fn create_temp_rules(content: &str, ext: &str) -> PathBuf {
        let _lock = TEMP_LOCK.lock().unwrap();
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::SeqCst);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();

        let path = std::env::temp_dir().join(format!(
            "path_matcher_test_{}_{}_{}.{}",
            std::process::id(),
            counter,
            nanos,
            ext
        ));

        std::fs::write(&path, content).unwrap();
        path
    }

    /// Creates a temporary rule file with yaml extension
    pub fn create_temp_yaml(content: &str) -> PathBuf {
        create_temp_rules(content, "yaml")
    }

    /// Creates a temporary rule file with json extension
    pub fn create_temp_json(content: &str) -> PathBuf {
        create_temp_rules(content, "json")
    }

    /// Cleanup temporary files (best effort)
    pub fn cleanup_temp_files(paths: &[PathBuf]) {
        for path in paths {
            let _ = std::fs::remove_file(path);
        }
    }
}

pub mod rules {
    /// Library service rules used across integration tests
    pub const LIBRARY_YAML: &str = r#"
http:
  rules:
    - selector: library.v1.Library.ListShelves
      get: /v1/shelves
    - selector: library.v1.Library.GetShelf
      get: /v1/{name=shelves/*}
    - selector: library.v1.Library.DeleteShelf
      delete: /v1/{name=shelves/*}
    - selector: library.v1.Library.MergeShelves
      post: /v1/{name=shelves/*}:merge
      body: "*"
    - selector: library.v1.Library.CreateBook
      post: /v1/{parent=shelves/*}/books
      body: book
      additional_bindings:
        - post: /v1/books
          body: book
    - selector: library.v1.Library.GetBook
      get: /v1/{name=shelves/*/books/*}
    - selector: library.v1.Library.MoveBook
      post: /v1/{name=shelves/*/books/*}:move
    - selector: library.v1.Library.ReadFile
      get: /v1/{path=files/**}
"#;
}
