use naga::valid::{Capabilities, ValidationFlags, Validator};

/// Shader stage kind.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StageKind {
    Vertex,
    Fragment,
}

impl StageKind {
    pub(crate) fn naga_stage(self) -> naga::ShaderStage {
        match self {
            StageKind::Vertex => naga::ShaderStage::Vertex,
            StageKind::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

/// Surfaced compile/link diagnostics are capped at this many bytes.
pub(crate) const DIAGNOSTIC_LIMIT: usize = 512;

/// Truncates a diagnostic to [`DIAGNOSTIC_LIMIT`], backing off to the
/// nearest char boundary.
pub(crate) fn truncate_diagnostic(mut text: String) -> String {
    if text.len() > DIAGNOSTIC_LIMIT {
        let mut end = DIAGNOSTIC_LIMIT;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
    }
    text
}

/// One compiled shader stage.
///
/// Compilation failure is not fatal: the stage is carried forward marked
/// failed, so the caller can compile both stages and batch-report their
/// diagnostics in one run. The linker rejects failed stages.
///
/// The source text is retained; device-side module creation happens later,
/// at pipeline build time, and only for programs that validated here.
pub struct CompiledStage {
    pub(crate) kind: StageKind,
    pub(crate) source: String,
    pub(crate) module: Option<naga::Module>,
    pub(crate) diagnostic: Option<String>,
}

impl CompiledStage {
    /// Parses and validates `source` as WGSL for the given stage.
    pub fn compile(source: &str, kind: StageKind) -> Self {
        let module = match naga::front::wgsl::parse_str(source) {
            Ok(module) => module,
            Err(err) => {
                return Self {
                    kind,
                    source: source.to_string(),
                    module: None,
                    diagnostic: Some(truncate_diagnostic(err.emit_to_string(source))),
                };
            }
        };

        let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
        match validator.validate(&module) {
            Ok(_) => Self {
                kind,
                source: source.to_string(),
                module: Some(module),
                diagnostic: None,
            },
            Err(err) => {
                let diagnostic = truncate_diagnostic(error_chain(&err.into_inner()));
                Self {
                    kind,
                    source: source.to_string(),
                    module: None,
                    diagnostic: Some(diagnostic),
                }
            }
        }
    }

    pub fn kind(&self) -> StageKind {
        self.kind
    }

    /// True when the stage parsed and validated.
    pub fn is_ok(&self) -> bool {
        self.module.is_some()
    }

    /// Compile diagnostic, when compilation failed. Never empty, at most
    /// [`DIAGNOSTIC_LIMIT`] bytes.
    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    pub(crate) fn module(&self) -> Option<&naga::Module> {
        self.module.as_ref()
    }

    /// Consumes the stage, releasing the parsed module and keeping only the
    /// source text.
    pub(crate) fn into_source(self) -> String {
        self.source
    }
}

/// Flattens an error and its causes into one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut cause = err.source();
    while let Some(err) = cause {
        text.push_str(": ");
        text.push_str(&err.to_string());
        cause = err.source();
    }
    text
}
