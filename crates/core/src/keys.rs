//! Key-list normalization for `hide` and `forget`.
//!
//! Both accept a single key, several keys at once (an array literal stands in
//! for a variadic call), or any owned/borrowed sequence of keys.

/// Anything that can be flattened into a list of output keys.
pub trait Keys {
    fn into_keys(self) -> Vec<String>;
}

impl Keys for &str {
    fn into_keys(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl Keys for String {
    fn into_keys(self) -> Vec<String> {
        vec![self]
    }
}

impl Keys for &String {
    fn into_keys(self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl<S: Into<String>, const N: usize> Keys for [S; N] {
    fn into_keys(self) -> Vec<String> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<S: Into<String>> Keys for Vec<S> {
    fn into_keys(self) -> Vec<String> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<S: AsRef<str>> Keys for &[S] {
    fn into_keys(self) -> Vec<String> {
        self.iter().map(|k| k.as_ref().to_string()).collect()
    }
}
