/// Top-level view selection, carried explicitly instead of as ambient
/// mutable state. Parsed from the role argument on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Landing,
    Student { student_id: String },
    Teacher,
}

impl View {
    /// `student [id]` or `teacher`; anything else lands on role selection.
    pub fn from_args<I>(mut args: I, default_student_id: &str) -> View
    where
        I: Iterator<Item = String>,
    {
        match args.next().as_deref() {
            Some("student") => View::Student {
                student_id: args.next().unwrap_or_else(|| default_student_id.into()),
            },
            Some("teacher") => View::Teacher,
            _ => View::Landing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> View {
        View::from_args(args.iter().map(|s| s.to_string()), "student_1")
    }

    #[test]
    fn roles_parse_explicitly() {
        assert_eq!(
            parse(&["student", "student_7"]),
            View::Student {
                student_id: "student_7".into()
            }
        );
        assert_eq!(
            parse(&["student"]),
            View::Student {
                student_id: "student_1".into()
            }
        );
        assert_eq!(parse(&["teacher"]), View::Teacher);
    }

    #[test]
    fn everything_else_lands() {
        assert_eq!(parse(&[]), View::Landing);
        assert_eq!(parse(&["admin"]), View::Landing);
    }
}
