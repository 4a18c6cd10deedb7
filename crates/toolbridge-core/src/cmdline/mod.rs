//! Command-line construction.
//!
//! [`build`] is a pure function of the executable path, the negotiated
//! [`Capabilities`] and the [`InvocationRequest`]. Each tool speaks one
//! [`Grammar`]; the grammar decides the argument order and which
//! [`InvocationMode`] the run uses.

pub mod ultimate;

use std::path::{Path, PathBuf};

use crate::error::AdapterError;
use crate::negotiate::tool_dir;
use crate::types::{Capabilities, ClassificationContext, InvocationMode, InvocationRequest};

pub use ultimate::UltimateGrammar;

/// Argument layout of a tool.
#[derive(Debug, Clone)]
pub enum Grammar {
    /// `exe options.. [property_flag property] inputs..`.
    ///
    /// Without a property file the structured-output flag, if any, is
    /// appended when the caller did not pass it.
    Cprover {
        property_flag: &'static str,
        structured_flag: Option<&'static str>,
    },
    /// `exe property_flag property options.. input`, exactly one input,
    /// started from the tool directory.
    PropertyFirst { property_flag: &'static str },
    /// `exe options.. flag property input`, exactly one input, started from
    /// the tool directory. Generations up to `legacy_generation` use
    /// `legacy_flag`.
    PropertyLast {
        legacy_generation: u32,
        legacy_flag: &'static str,
        property_flag: &'static str,
    },
    /// Wrapper, legacy and direct-runtime grammars of launcher-based tools.
    Ultimate(UltimateGrammar),
}

/// A validated command line plus what the classifier needs to know about
/// it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltCommand {
    pub argv: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub context: ClassificationContext,
}

/// Build the command line for one run of `tool`.
pub fn build(
    tool: &str,
    grammar: &Grammar,
    executable: &Path,
    caps: &Capabilities,
    request: &InvocationRequest,
) -> Result<BuiltCommand, AdapterError> {
    let exe = executable.display().to_string();

    let built = match grammar {
        Grammar::Cprover {
            property_flag,
            structured_flag,
        } => {
            let mut options = request.options.clone();
            if let Some(property) = &request.property_file {
                options.push((*property_flag).to_owned());
                options.push(property.clone());
            } else if let Some(flag) = structured_flag {
                if !request.has_option(flag) {
                    options.push((*flag).to_owned());
                }
            }

            let mut argv = vec![exe];
            argv.extend(options.iter().cloned());
            argv.extend(request.inputs.iter().cloned());

            let structured_output = structured_flag
                .map(|flag| options.iter().any(|o| o == flag))
                .unwrap_or(false);
            let mode = if request.property_file.is_some() {
                InvocationMode::PropertyFile
            } else {
                InvocationMode::Plain
            };

            Draft {
                argv,
                working_dir: None,
                mode,
                options,
                uses_property_file: request.property_file.is_some(),
                structured_output,
            }
        }
        Grammar::PropertyFirst { property_flag } => {
            let (property, input) = single_input_with_property(tool, request)?;

            let mut argv = vec![exe, (*property_flag).to_owned(), property.to_owned()];
            argv.extend(request.options.iter().cloned());
            argv.push(input.to_owned());

            Draft {
                argv,
                working_dir: Some(tool_dir(executable).to_path_buf()),
                mode: InvocationMode::PropertyFile,
                options: request.options.clone(),
                uses_property_file: true,
                structured_output: false,
            }
        }
        Grammar::PropertyLast {
            legacy_generation,
            legacy_flag,
            property_flag,
        } => {
            let (property, input) = single_input_with_property(tool, request)?;
            let flag = if caps.generation <= *legacy_generation {
                legacy_flag
            } else {
                property_flag
            };

            let mut argv = vec![exe];
            argv.extend(request.options.iter().cloned());
            argv.extend([(*flag).to_owned(), property.to_owned(), input.to_owned()]);

            Draft {
                argv,
                working_dir: Some(tool_dir(executable).to_path_buf()),
                mode: InvocationMode::PropertyFile,
                options: request.options.clone(),
                uses_property_file: true,
                structured_output: false,
            }
        }
        Grammar::Ultimate(grammar) => ultimate::build(grammar, executable, caps, request)?,
    };

    built.finish(tool, caps)
}

/// Command line before validation.
#[derive(Debug, Clone)]
pub(crate) struct Draft {
    pub argv: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub mode: InvocationMode,
    pub options: Vec<String>,
    pub uses_property_file: bool,
    pub structured_output: bool,
}

impl Draft {
    fn finish(self, tool: &str, caps: &Capabilities) -> Result<BuiltCommand, AdapterError> {
        let argv = validate(self.argv)?;
        Ok(BuiltCommand {
            argv,
            working_dir: self.working_dir,
            context: ClassificationContext {
                tool: tool.to_owned(),
                mode: self.mode,
                options: self.options,
                uses_property_file: self.uses_property_file,
                structured_output: self.structured_output,
                generation: caps.generation,
            },
        })
    }
}

/// Reject command lines containing an empty argument.
pub fn validate(argv: Vec<String>) -> Result<Vec<String>, AdapterError> {
    if argv.is_empty() || argv.iter().any(|a| a.is_empty()) {
        return Err(AdapterError::MalformedCommandLine { argv });
    }
    Ok(argv)
}

fn single_input_with_property<'a>(
    tool: &str,
    request: &'a InvocationRequest,
) -> Result<(&'a str, &'a str), AdapterError> {
    let property = request.property_file.as_deref().ok_or_else(|| {
        AdapterError::UnsupportedInvocation(format!("{tool} requires a property file"))
    })?;
    match request.inputs.as_slice() {
        [input] => Ok((property, input)),
        inputs => Err(AdapterError::UnsupportedInvocation(format!(
            "{tool} supports exactly one input file, got {}",
            inputs.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CBMC: Grammar = Grammar::Cprover {
        property_flag: "--propertyfile",
        structured_flag: Some("--xml-ui"),
    };

    #[test]
    fn cprover_appends_structured_flag_without_property() {
        let req = InvocationRequest::new().option("--unwind").option("5").input("a.c");
        let built = build("cbmc", &CBMC, Path::new("cbmc"), &Capabilities::fixed(0), &req).unwrap();

        assert_eq!(built.argv, vec!["cbmc", "--unwind", "5", "--xml-ui", "a.c"]);
        assert!(built.context.structured_output);
        assert_eq!(built.context.mode, InvocationMode::Plain);
    }

    #[test]
    fn cprover_does_not_duplicate_structured_flag() {
        let req = InvocationRequest::new().option("--xml-ui").input("a.c");
        let built = build("cbmc", &CBMC, Path::new("cbmc"), &Capabilities::fixed(0), &req).unwrap();
        assert_eq!(built.argv, vec!["cbmc", "--xml-ui", "a.c"]);
    }

    #[test]
    fn cprover_with_property_uses_competition_output() {
        let req = InvocationRequest::new()
            .option("--32")
            .property_file("unreach-call.prp")
            .input("a.c");
        let built = build("cbmc", &CBMC, Path::new("cbmc"), &Capabilities::fixed(0), &req).unwrap();

        assert_eq!(
            built.argv,
            vec!["cbmc", "--32", "--propertyfile", "unreach-call.prp", "a.c"]
        );
        assert!(!built.context.structured_output);
        assert!(built.context.uses_property_file);
        assert_eq!(built.context.mode, InvocationMode::PropertyFile);
    }

    #[test]
    fn property_first_runs_from_tool_dir() {
        let grammar = Grammar::PropertyFirst { property_flag: "-p" };
        let req = InvocationRequest::new()
            .option("-s")
            .option("kinduction")
            .property_file("p.prp")
            .input("a.c");
        let built = build(
            "esbmc",
            &grammar,
            Path::new("/opt/esbmc/esbmc-wrapper.py"),
            &Capabilities::fixed(0),
            &req,
        )
        .unwrap();

        assert_eq!(
            built.argv,
            vec!["/opt/esbmc/esbmc-wrapper.py", "-p", "p.prp", "-s", "kinduction", "a.c"]
        );
        assert_eq!(built.working_dir.as_deref(), Some(Path::new("/opt/esbmc")));
    }

    #[test]
    fn property_first_rejects_multiple_inputs() {
        let grammar = Grammar::PropertyFirst { property_flag: "-p" };
        let req = InvocationRequest::new().property_file("p.prp").inputs(["a.c", "b.c"]);
        let err = build("esbmc", &grammar, Path::new("esbmc"), &Capabilities::fixed(0), &req)
            .unwrap_err();
        assert!(matches!(err, AdapterError::UnsupportedInvocation(msg) if msg.contains("got 2")));
    }

    #[test]
    fn property_last_switches_flag_by_generation() {
        let grammar = Grammar::PropertyLast {
            legacy_generation: 6,
            legacy_flag: "-c",
            property_flag: "-p",
        };
        let req = InvocationRequest::new().option("--timeout").option("900").property_file("p.prp").input("a.c");

        let old = build("map2check", &grammar, Path::new("m2c"), &Capabilities::fixed(6), &req).unwrap();
        assert_eq!(old.argv, vec!["m2c", "--timeout", "900", "-c", "p.prp", "a.c"]);

        let new = build("map2check", &grammar, Path::new("m2c"), &Capabilities::fixed(7), &req).unwrap();
        assert_eq!(new.argv, vec!["m2c", "--timeout", "900", "-p", "p.prp", "a.c"]);
        assert_eq!(new.context.generation, 7);
    }

    #[test]
    fn property_last_requires_property_file() {
        let grammar = Grammar::PropertyLast {
            legacy_generation: 6,
            legacy_flag: "-c",
            property_flag: "-p",
        };
        let req = InvocationRequest::new().input("a.c");
        let err = build("map2check", &grammar, Path::new("m2c"), &Capabilities::fixed(7), &req)
            .unwrap_err();
        assert!(matches!(err, AdapterError::UnsupportedInvocation(_)));
    }

    #[test]
    fn empty_argument_is_rejected_with_full_vector() {
        let req = InvocationRequest::new().option("").input("a.c");
        match build("cbmc", &CBMC, Path::new("cbmc"), &Capabilities::fixed(0), &req) {
            Err(AdapterError::MalformedCommandLine { argv }) => {
                assert_eq!(argv, vec!["cbmc", "", "--xml-ui", "a.c"]);
            }
            other => panic!("expected MalformedCommandLine, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_empty_vector() {
        assert!(validate(Vec::new()).is_err());
        assert_eq!(validate(vec!["x".into()]).unwrap(), vec!["x"]);
    }
}
