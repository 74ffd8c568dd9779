/// Builds a [`PimlValue`](crate::PimlValue) from a JSON-like literal.
///
/// - `nil` gives [`PimlValue::Nil`](crate::PimlValue::Nil)
/// - `[a, b]` gives a list, `set [a, b]` a set
/// - `{ "key": value }` gives a record in the written order
/// - anything else goes through `PimlValue::from`
///
/// # Examples
///
/// ```rust
/// use serde_piml::{piml, to_string};
///
/// let site = piml!({
///     "name": "Example",
///     "port": 8080,
///     "tags": ["web", "docs"],
///     "owner": nil
/// });
/// assert_eq!(
///     to_string(&site).unwrap(),
///     "(name) Example\n(port) 8080\n(tags)\n  > web\n  > docs\n(owner) nil\n"
/// );
/// ```
#[macro_export]
macro_rules! piml {
    (nil) => {
        $crate::PimlValue::Nil
    };

    ([]) => {
        $crate::PimlValue::List(::std::vec::Vec::new())
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::PimlValue::List(vec![$($crate::piml!($elem)),*])
    };

    (set [ $($member:expr),* $(,)? ]) => {
        $crate::PimlValue::Set(vec![$(::std::string::ToString::to_string(&$member)),*])
    };

    ({}) => {
        $crate::PimlValue::Record($crate::PimlMap::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut record = $crate::PimlMap::new();
        $(
            record.insert(::std::string::ToString::to_string($key), $crate::piml!($value));
        )*
        $crate::PimlValue::Record(record)
    }};

    ($other:expr) => {
        $crate::PimlValue::from($other)
    };
}

#[cfg(test)]
mod tests {
    use crate::{PimlMap, PimlValue};

    #[test]
    fn test_piml_macro_scalars() {
        assert_eq!(piml!(nil), PimlValue::Nil);
        assert_eq!(piml!(true), PimlValue::Scalar("true".into()));
        assert_eq!(piml!(42), PimlValue::Scalar("42".into()));
        assert_eq!(piml!("hello"), PimlValue::Scalar("hello".into()));
    }

    #[test]
    fn test_piml_macro_collections() {
        assert_eq!(piml!([]), PimlValue::List(vec![]));
        assert_eq!(
            piml!([1, nil]),
            PimlValue::List(vec![PimlValue::from(1), PimlValue::Nil])
        );
        assert_eq!(
            piml!(set ["a", "b"]),
            PimlValue::Set(vec!["a".into(), "b".into()])
        );
        assert_eq!(piml!({}), PimlValue::Record(PimlMap::new()));
    }

    #[test]
    fn test_piml_macro_nested_record() {
        let value = piml!({
            "server": { "host": "localhost", "port": 80 },
            "debug": false
        });
        let server = value.get("server").unwrap();
        assert_eq!(server.get("port"), Some(&PimlValue::from(80)));
        assert_eq!(value.get("debug").and_then(PimlValue::as_bool), Some(false));
    }
}
