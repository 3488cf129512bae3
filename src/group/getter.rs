//! Data-source callback.

/// Source of truth consulted on a miss that no peer can serve.
///
/// Runs on the blocking thread pool, so implementations may do blocking I/O.
/// Any closure `Fn(&str) -> anyhow::Result<Vec<u8>>` is a `Getter`.
pub trait Getter: Send + Sync + 'static {
    fn get(&self, key: &str) -> anyhow::Result<Vec<u8>>;
}

impl<F> Getter for F
where
    F: Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync + 'static,
{
    fn get(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        self(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapSource(HashMap<String, String>);

    impl Getter for MapSource {
        fn get(&self, key: &str) -> anyhow::Result<Vec<u8>> {
            self.0
                .get(key)
                .map(|v| v.clone().into_bytes())
                .ok_or_else(|| anyhow::anyhow!("{} not exist", key))
        }
    }

    #[test]
    fn test_closure_is_getter() {
        let getter = |key: &str| -> anyhow::Result<Vec<u8>> { Ok(key.as_bytes().to_vec()) };
        assert_eq!(Getter::get(&getter, "key").unwrap(), b"key");
    }

    #[test]
    fn test_struct_getter() {
        let source = MapSource(HashMap::from([("Tom".to_string(), "630".to_string())]));
        assert_eq!(source.get("Tom").unwrap(), b"630");
        assert_eq!(source.get("Sam").unwrap_err().to_string(), "Sam not exist");
    }
}
