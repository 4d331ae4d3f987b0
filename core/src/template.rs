//! Command templates with `{workers}`, `{threshold}` and `{size}` placeholders

use std::fmt;

use crate::error::{SweepError, SweepResult};

/// Placeholder names understood by [`render`]
pub const PLACEHOLDERS: [&str; 3] = ["workers", "threshold", "size"];

/// Parameter values of one configuration point
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    /// Worker count
    pub workers: Option<u32>,
    /// Split threshold
    pub threshold: Option<u32>,
    /// Problem size
    pub size: Option<u32>,
}

impl Point {
    fn get(&self, name: &str) -> Option<u32> {
        match name {
            "workers" => self.workers,
            "threshold" => self.threshold,
            "size" => self.size,
            _ => None,
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(w) = self.workers {
            parts.push(format!("workers={w}"));
        }
        if let Some(t) = self.threshold {
            parts.push(format!("threshold={t}"));
        }
        if let Some(s) = self.size {
            parts.push(format!("size={s}"));
        }
        if parts.is_empty() {
            write!(f, "baseline")
        } else {
            write!(f, "{}", parts.join(" "))
        }
    }
}

/// Placeholder named at the start of `s`, which follows an opening brace
///
/// Only `{workers}`, `{threshold}` and `{size}` are placeholders. Any other
/// brace, such as a shell `${VAR}` or an awk `{print $0}`, is plain text.
fn placeholder_at(s: &str) -> Option<&'static str> {
    PLACEHOLDERS
        .into_iter()
        .find(|name| s.strip_prefix(name).is_some_and(|r| r.starts_with('}')))
}

/// Names of the placeholders used in `template`, in order of appearance
pub fn placeholders(template: &str) -> Vec<&'static str> {
    let mut names = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match placeholder_at(after) {
            Some(name) => {
                names.push(name);
                rest = &after[name.len() + 1..];
            }
            None => rest = after,
        }
    }

    names
}

/// Substitute the values of `point` into `template`
///
/// Text outside the placeholders is copied unchanged.
pub fn render(template: &str, point: &Point) -> SweepResult<String> {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(name) = placeholder_at(after) else {
            out.push('{');
            rest = after;
            continue;
        };
        let value = point.get(name).ok_or_else(|| {
            SweepError::template(template, format!("no value for '{{{name}}}' at {point}"))
        })?;
        out.push_str(&value.to_string());
        rest = &after[name.len() + 1..];
    }
    out.push_str(rest);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_all_placeholders() {
        let point = Point {
            workers: Some(8),
            threshold: Some(4),
            size: Some(14),
        };
        let cmd = render("./run.sh {workers} {size} {threshold}", &point).unwrap();
        assert_eq!(cmd, "./run.sh 8 14 4");
    }

    #[test]
    fn test_render_without_placeholders() {
        let cmd = render("./scripts/run_matrix_sequential.sh", &Point::default()).unwrap();
        assert_eq!(cmd, "./scripts/run_matrix_sequential.sh");
    }

    #[test]
    fn test_render_missing_value() {
        let point = Point {
            workers: Some(2),
            ..Default::default()
        };
        let err = render("./run.sh {workers} {size}", &point).unwrap_err();
        assert!(err.to_string().contains("{size}"));
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(
            placeholders("./run.sh {size} {threshold}"),
            vec!["size", "threshold"]
        );
        assert!(placeholders("./run.sh {threads}").is_empty());
        assert!(placeholders("./run.sh {size").is_empty());
        assert_eq!(
            placeholders("java -jar b.jar {workers} | awk '{print $0}'"),
            vec!["workers"]
        );
    }

    #[test]
    fn test_render_keeps_shell_and_awk_braces() {
        let point = Point {
            workers: Some(4),
            ..Default::default()
        };
        assert_eq!(
            render("${BENCH_HOME}/run.sh {workers}", &point).unwrap(),
            "${BENCH_HOME}/run.sh 4"
        );
        assert_eq!(
            render("java -jar b.jar {workers} | awk '{print $0}'", &point).unwrap(),
            "java -jar b.jar 4 | awk '{print $0}'"
        );
        assert_eq!(
            render("echo {{workers}} {size", &point).unwrap(),
            "echo {4} {size"
        );
    }

    #[test]
    fn test_point_display() {
        let point = Point {
            workers: Some(4),
            threshold: Some(32),
            size: None,
        };
        assert_eq!(point.to_string(), "workers=4 threshold=32");
        assert_eq!(Point::default().to_string(), "baseline");
    }
}
