//! Span 单元测试
//!
//! 测试 Position、Span 以及 ESTree 位置格式的反序列化

use crate::util::span::{Position, Span};

#[cfg(test)]
mod position_tests {
    use super::*;

    #[test]
    fn test_position_creation() {
        let pos = Position::new(1, 5);
        assert_eq!(pos.line, 1);
        assert_eq!(pos.column, 5);
        assert_eq!(pos.offset, 0);
    }

    #[test]
    fn test_position_display() {
        assert_eq!(format!("{}", Position::new(10, 20)), "10:20");
        // 没有行信息时退化为偏移量
        assert_eq!(format!("{}", Position::at_offset(42)), "42");
    }
}

#[cfg(test)]
mod span_tests {
    use super::*;

    #[test]
    fn test_span_from_offsets() {
        let span = Span::from_offsets(3, 9);
        assert_eq!(span.len(), 6);
        assert!(!span.is_empty());
        assert!(!span.is_dummy());
        assert_eq!(format!("{}", span), "[3 - 9]");
    }

    #[test]
    fn test_span_dummy() {
        assert!(Span::dummy().is_dummy());
        assert!(Span::default().is_dummy());
    }

    #[test]
    fn test_span_contains() {
        let outer = Span::from_offsets(0, 100);
        assert!(outer.contains(&Span::from_offsets(10, 20)));
        assert!(!outer.contains(&Span::from_offsets(90, 110)));
    }
}

#[cfg(test)]
mod deserialize_tests {
    use super::*;

    #[test]
    fn test_acorn_offsets() {
        let span: Span = serde_json::from_str(r#"{"start": 4, "end": 12}"#).unwrap();
        assert_eq!(span, Span::from_offsets(4, 12));
    }

    #[test]
    fn test_esprima_range() {
        let span: Span = serde_json::from_str(r#"{"range": [7, 15]}"#).unwrap();
        assert_eq!(span.start.offset, 7);
        assert_eq!(span.end.offset, 15);
    }

    #[test]
    fn test_loc_columns_are_one_based() {
        let span: Span = serde_json::from_str(
            r#"{"start": 0, "end": 5, "loc": {"start": {"line": 1, "column": 0}, "end": {"line": 1, "column": 5}}}"#,
        )
        .unwrap();
        assert_eq!(span.start, Position::with_offset(1, 1, 0));
        assert_eq!(span.end, Position::with_offset(1, 6, 5));
        assert_eq!(format!("{}", span), "[1:1 - 1:6]");
    }

    #[test]
    fn test_missing_position_is_dummy() {
        let span: Span = serde_json::from_str("{}").unwrap();
        assert!(span.is_dummy());
    }
}
