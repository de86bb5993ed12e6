use ciborium::value::Value;

/// Normalize a decoded byte-string field to an ordered byte sequence.
///
/// Key material normally arrives as a CBOR byte string, but some registries
/// re-encode buffers as an integer array or as a map keyed by index
/// (`{0: 46, 1: 214, ...}`, keys as integers or decimal text). All three
/// shapes collapse to the same `Vec<u8>` here so nothing downstream has to
/// care. Anything else, including an index map with gaps or values outside
/// `0..=255`, is `None`.
pub(crate) fn byte_string(value: &Value) -> Option<Vec<u8>> {
    match value {
        Value::Bytes(b) => Some(b.clone()),
        Value::Array(items) => items.iter().map(byte_value).collect(),
        Value::Map(entries) => {
            let mut indexed = entries
                .iter()
                .map(|(k, v)| Some((index_key(k)?, byte_value(v)?)))
                .collect::<Option<Vec<(usize, u8)>>>()?;
            indexed.sort_by_key(|(i, _)| *i);
            if indexed.iter().enumerate().any(|(pos, (i, _))| pos != *i) {
                return None;
            }
            Some(indexed.into_iter().map(|(_, b)| b).collect())
        }
        Value::Tag(_, inner) => byte_string(inner),
        _ => None,
    }
}

fn byte_value(value: &Value) -> Option<u8> {
    match value {
        Value::Integer(i) => u8::try_from(i128::from(*i)).ok(),
        _ => None,
    }
}

fn index_key(key: &Value) -> Option<usize> {
    match key {
        Value::Integer(i) => usize::try_from(i128::from(*i)).ok(),
        Value::Text(t) => t.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(i: i64) -> Value {
        Value::Integer(i.into())
    }

    #[test]
    fn test_dense_bytes_pass_through() {
        assert_eq!(byte_string(&Value::Bytes(vec![1, 2, 3])), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_integer_array() {
        let v = Value::Array(vec![int(46), int(214)]);
        assert_eq!(byte_string(&v), Some(vec![46, 214]));
    }

    #[test]
    fn test_index_map_out_of_order() {
        let v = Value::Map(vec![
            (Value::Text("1".into()), int(214)),
            (Value::Text("0".into()), int(46)),
            (int(2), int(7)),
        ]);
        assert_eq!(byte_string(&v), Some(vec![46, 214, 7]));
    }

    #[test]
    fn test_index_map_with_gap_rejected() {
        let v = Value::Map(vec![(int(0), int(1)), (int(2), int(3))]);
        assert_eq!(byte_string(&v), None);
    }

    #[test]
    fn test_out_of_range_byte_rejected() {
        assert_eq!(byte_string(&Value::Array(vec![int(256)])), None);
        assert_eq!(byte_string(&Value::Array(vec![int(-1)])), None);
    }

    #[test]
    fn test_other_shapes_rejected() {
        assert_eq!(byte_string(&Value::Text("abc".into())), None);
        assert_eq!(byte_string(&int(5)), None);
    }
}
