//! Command line construction for external build tools

use std::fmt;

/// Fluent builder for an argument list
///
/// ```rust,ignore
/// let args = ArgumentsBuilder::new()
///     .argument("publish", "Api.csproj")
///     .property("PublishProfile", "DefaultContainer")
///     .argument("--os", "linux")
///     .build();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentsBuilder {
    args: Vec<String>,
}

impl ArgumentsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `name value`, or just `name` when `value` is empty
    pub fn argument(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.push(name.into());
        let value = value.into();
        if !value.is_empty() {
            self.args.push(value);
        }
        self
    }

    pub fn flag(mut self, name: impl Into<String>) -> Self {
        self.args.push(name.into());
        self
    }

    /// MSBuild property, `-p:Name=value`
    pub fn property(mut self, name: &str, value: impl fmt::Display) -> Self {
        self.args.push(format!("-p:{name}={value}"));
        self
    }

    /// MSBuild property, skipped when `value` is missing or empty
    pub fn property_if_set(self, name: &str, value: Option<&str>) -> Self {
        match value.filter(|v| !v.is_empty()) {
            Some(value) => self.property(name, value),
            None => self,
        }
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn build(self) -> Vec<String> {
        self.args
    }
}

impl fmt::Display for ArgumentsBuilder {
    /// Space separated, quoting arguments that contain whitespace
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            if arg.contains(char::is_whitespace) {
                write!(f, "\"{arg}\"")?;
            } else {
                f.write_str(arg)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let builder = ArgumentsBuilder::new()
            .argument("build", "")
            .argument("-t", "web:latest")
            .property("PublishTrimmed", false)
            .property_if_set("ContainerRegistry", Some(""))
            .property_if_set("ContainerRepository", None)
            .property_if_set("ContainerImageName", Some("web"))
            .flag("./my app");

        assert_eq!(
            builder.args(),
            [
                "build",
                "-t",
                "web:latest",
                "-p:PublishTrimmed=false",
                "-p:ContainerImageName=web",
                "./my app"
            ]
        );
        assert_eq!(
            builder.to_string(),
            "build -t web:latest -p:PublishTrimmed=false -p:ContainerImageName=web \"./my app\""
        );
    }
}
