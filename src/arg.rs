//! The source-agnostic view of a single argument.

/// A read-only view of one option or positional argument.
///
/// Adapters produce these from whatever holds the argument state; the
/// builder consumes them without knowing where they came from. Every
/// accessor must return the same answer for the duration of a build.
pub trait Arg {
    /// Whether this is a named option rather than a positional argument.
    fn is_option(&self) -> bool;

    /// Whether the argument differs from its default state and must appear
    /// in the output at all.
    fn is_provided(&self) -> bool;

    /// Whether the option may be written without a value (booleans and
    /// options declared with an implicit value).
    fn is_value_optional(&self) -> bool;

    /// Whether an explicit value has to be rendered. Always equal to
    /// `is_provided` when the value is not optional.
    fn is_value_provided(&self) -> bool;

    /// Long name, empty for positionals and short-only options.
    fn name(&self) -> &str;

    /// One-character short name, empty when there is none.
    fn short_name(&self) -> &str;

    /// The values as opaque strings. Map entries are `key:value`, sorted by key.
    fn value(&self) -> Vec<String>;

    /// Path used to identify the argument in errors.
    fn field(&self) -> String {
        if !self.name().is_empty() {
            self.name().to_string()
        } else if !self.short_name().is_empty() {
            self.short_name().to_string()
        } else {
            "<positional>".to_string()
        }
    }

    /// Type name used in errors.
    fn kind(&self) -> String {
        if self.is_option() {
            "option".to_string()
        } else {
            "positional".to_string()
        }
    }
}

impl<T: Arg + ?Sized> Arg for &T {
    fn is_option(&self) -> bool {
        (**self).is_option()
    }
    fn is_provided(&self) -> bool {
        (**self).is_provided()
    }
    fn is_value_optional(&self) -> bool {
        (**self).is_value_optional()
    }
    fn is_value_provided(&self) -> bool {
        (**self).is_value_provided()
    }
    fn name(&self) -> &str {
        (**self).name()
    }
    fn short_name(&self) -> &str {
        (**self).short_name()
    }
    fn value(&self) -> Vec<String> {
        (**self).value()
    }
    fn field(&self) -> String {
        (**self).field()
    }
    fn kind(&self) -> String {
        (**self).kind()
    }
}

impl<T: Arg + ?Sized> Arg for Box<T> {
    fn is_option(&self) -> bool {
        (**self).is_option()
    }
    fn is_provided(&self) -> bool {
        (**self).is_provided()
    }
    fn is_value_optional(&self) -> bool {
        (**self).is_value_optional()
    }
    fn is_value_provided(&self) -> bool {
        (**self).is_value_provided()
    }
    fn name(&self) -> &str {
        (**self).name()
    }
    fn short_name(&self) -> &str {
        (**self).short_name()
    }
    fn value(&self) -> Vec<String> {
        (**self).value()
    }
    fn field(&self) -> String {
        (**self).field()
    }
    fn kind(&self) -> String {
        (**self).kind()
    }
}

/// A fully resolved argument with every accessor stored as plain data.
///
/// This is what the adapters hand to the builder, and the easiest way to
/// describe arguments by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgState {
    pub is_option: bool,
    pub is_provided: bool,
    pub is_value_optional: bool,
    pub is_value_provided: bool,
    pub name: String,
    pub short_name: String,
    pub value: Vec<String>,
    /// Field path reported in errors, defaults to the option names.
    pub field: Option<String>,
    /// Type name reported in errors.
    pub kind: Option<String>,
}

impl ArgState {
    /// A positional argument. Positionals are always provided; an empty
    /// value list simply renders nothing.
    pub fn positional<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            is_provided: true,
            is_value_provided: true,
            value: values.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// A provided option that requires a value for each entry in `values`.
    pub fn option<I, S>(name: &str, short: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            is_option: true,
            is_provided: true,
            is_value_provided: true,
            name: name.to_string(),
            short_name: short.to_string(),
            value: values.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// A provided boolean switch written in its bare form.
    pub fn switch(name: &str, short: &str) -> Self {
        Self {
            is_option: true,
            is_provided: true,
            is_value_optional: true,
            name: name.to_string(),
            short_name: short.to_string(),
            value: vec!["true".to_string()],
            ..Self::default()
        }
    }

    /// An option whose value may be omitted, rendered with `values` attached.
    pub fn optional<I, S>(name: &str, short: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            is_option: true,
            is_provided: true,
            is_value_optional: true,
            is_value_provided: true,
            name: name.to_string(),
            short_name: short.to_string(),
            value: values.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Marks the argument as absent from the output.
    pub fn unprovided(mut self) -> Self {
        self.is_provided = false;
        self.is_value_provided = false;
        self
    }

    pub fn with_field(mut self, path: impl Into<String>, kind: impl Into<String>) -> Self {
        self.field = Some(path.into());
        self.kind = Some(kind.into());
        self
    }
}

impl Arg for ArgState {
    fn is_option(&self) -> bool {
        self.is_option
    }

    fn is_provided(&self) -> bool {
        self.is_provided
    }

    fn is_value_optional(&self) -> bool {
        self.is_value_optional
    }

    fn is_value_provided(&self) -> bool {
        self.is_value_provided
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn short_name(&self) -> &str {
        &self.short_name
    }

    fn value(&self) -> Vec<String> {
        self.value.clone()
    }

    fn field(&self) -> String {
        match &self.field {
            Some(path) => path.clone(),
            None if !self.name.is_empty() => self.name.clone(),
            None if !self.short_name.is_empty() => self.short_name.clone(),
            None => "<positional>".to_string(),
        }
    }

    fn kind(&self) -> String {
        match &self.kind {
            Some(kind) => kind.clone(),
            None if self.is_option => "option".to_string(),
            None => "positional".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_has_no_names() {
        let arg = ArgState::positional(["foo", "bar"]);
        assert!(!arg.is_option());
        assert!(arg.is_provided());
        assert!(arg.name().is_empty());
        assert!(arg.short_name().is_empty());
        assert_eq!(arg.value(), vec!["foo", "bar"]);
        assert_eq!(arg.field(), "<positional>");
        assert_eq!(arg.kind(), "positional");
    }

    #[test]
    fn test_switch_is_value_optional_without_value() {
        let arg = ArgState::switch("verbose", "v");
        assert!(arg.is_value_optional());
        assert!(!arg.is_value_provided());
        assert_eq!(arg.value(), vec!["true"]);
    }

    #[test]
    fn test_option_value_provided_tracks_provided() {
        let arg = ArgState::option("output", "o", ["out.txt"]);
        assert_eq!(arg.is_value_provided(), arg.is_provided());

        let arg = arg.unprovided();
        assert!(!arg.is_provided());
        assert!(!arg.is_value_provided());
    }

    #[test]
    fn test_field_falls_back_to_names() {
        assert_eq!(ArgState::switch("verbose", "v").field(), "verbose");
        assert_eq!(ArgState::switch("", "v").field(), "v");
        let arg = ArgState::switch("", "v").with_field("Options.Verbose", "bool");
        assert_eq!(arg.field(), "Options.Verbose");
        assert_eq!(arg.kind(), "bool");
    }

    #[test]
    fn test_reference_and_box_forward() {
        let arg = ArgState::option("name", "n", ["me"]);
        let by_ref: &dyn Arg = &arg;
        let boxed: Box<dyn Arg> = Box::new(arg.clone());
        assert_eq!(by_ref.name(), "name");
        assert_eq!(boxed.short_name(), "n");
        assert_eq!((&boxed).value(), vec!["me"]);
    }
}
