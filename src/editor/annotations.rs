//! Gutter annotations
//!
//! Diagnostics attached to buffer rows (compile errors, warnings, notes).
//! The editor keeps the list as given; [`gutter_markers`] folds it into one
//! marker per row for the gutter.

use std::collections::BTreeMap;

/// Severity of an annotation. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AnnotationKind {
    Info,
    Warning,
    Error,
}

/// A message attached to a 0-based buffer row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub row: usize,
    pub kind: AnnotationKind,
    pub text: String,
}

/// What the gutter shows for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GutterMarker {
    /// Most severe kind among the row's annotations
    pub kind: AnnotationKind,
    /// Hover text, one message per line in the order given
    pub text: String,
}

/// Fold `annotations` into one marker per row.
///
/// Rows at or past `line_count` are dropped.
pub fn gutter_markers(annotations: &[Annotation], line_count: usize) -> BTreeMap<usize, GutterMarker> {
    let mut markers: BTreeMap<usize, GutterMarker> = BTreeMap::new();
    for annotation in annotations.iter().filter(|a| a.row < line_count) {
        markers
            .entry(annotation.row)
            .and_modify(|marker| {
                marker.kind = marker.kind.max(annotation.kind);
                marker.text.push('\n');
                marker.text.push_str(&annotation.text);
            })
            .or_insert_with(|| GutterMarker {
                kind: annotation.kind,
                text: annotation.text.clone(),
            });
    }
    markers
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn note(row: usize, kind: AnnotationKind, text: &str) -> Annotation {
        Annotation {
            row,
            kind,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_annotation_rows_map_to_gutter_rows() {
        let annotations = vec![
            note(2, AnnotationKind::Error, "expected ';'"),
            note(0, AnnotationKind::Warning, "unused variable 'x'"),
        ];
        let markers = gutter_markers(&annotations, 5);
        assert_eq!(markers.keys().copied().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(markers[&0].kind, AnnotationKind::Warning);
        assert_eq!(markers[&2].kind, AnnotationKind::Error);
        assert_eq!(markers[&2].text, "expected ';'");
    }

    #[test]
    fn test_most_severe_kind_wins_and_messages_join() {
        let annotations = vec![
            note(1, AnnotationKind::Warning, "shadowed"),
            note(1, AnnotationKind::Error, "undeclared identifier"),
            note(1, AnnotationKind::Info, "declared here"),
        ];
        let markers = gutter_markers(&annotations, 3);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[&1].kind, AnnotationKind::Error);
        assert_eq!(
            markers[&1].text,
            "shadowed\nundeclared identifier\ndeclared here"
        );
    }

    #[test]
    fn test_rows_past_end_are_dropped() {
        let annotations = vec![
            note(3, AnnotationKind::Error, "stale"),
            note(2, AnnotationKind::Warning, "last line"),
        ];
        let markers = gutter_markers(&annotations, 3);
        assert_eq!(markers.keys().copied().collect::<Vec<_>>(), vec![2]);
        assert!(gutter_markers(&annotations, 0).is_empty());
    }

    #[test]
    fn test_kind_severity_order() {
        assert!(AnnotationKind::Error > AnnotationKind::Warning);
        assert!(AnnotationKind::Warning > AnnotationKind::Info);
    }
}
