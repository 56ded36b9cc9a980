use std::collections::HashMap;

use super::compile::{CompiledStage, StageKind, truncate_diagnostic};

/// Location of a uniform within the program's bind groups.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UniformLocation {
    pub group: u32,
    pub binding: u32,
}

/// A linked shader program.
///
/// Holds the validated WGSL for both stages, the entry point names, and a
/// table mapping uniform names to bind locations. Linking consumes the
/// stages: their parsed modules are released once the interface has been
/// checked and the uniform table extracted.
///
/// A failed link is non-fatal. The program is carried forward marked
/// failed; the renderer refuses to build a pipeline from it and every draw
/// becomes a no-op.
pub struct LinkedProgram {
    vertex_source: String,
    fragment_source: String,
    vertex_entry: String,
    fragment_entry: String,
    uniforms: HashMap<String, UniformLocation>,
    diagnostic: Option<String>,
}

impl LinkedProgram {
    /// Links a vertex and a fragment stage.
    pub fn link(vertex: CompiledStage, fragment: CompiledStage) -> Self {
        let diagnostic = link_error(&vertex, &fragment).map(truncate_diagnostic);

        let mut vertex_entry = String::new();
        let mut fragment_entry = String::new();
        let mut uniforms = HashMap::new();

        if diagnostic.is_none() {
            for stage in [&vertex, &fragment] {
                let Some(module) = stage.module() else { continue };
                if let Some(entry) = find_entry(module, stage.kind()) {
                    match stage.kind() {
                        StageKind::Vertex => vertex_entry = entry.name.clone(),
                        StageKind::Fragment => fragment_entry = entry.name.clone(),
                    }
                }
                collect_uniforms(module, &mut uniforms);
            }
        }

        Self {
            vertex_source: vertex.into_source(),
            fragment_source: fragment.into_source(),
            vertex_entry,
            fragment_entry,
            uniforms,
            diagnostic,
        }
    }

    /// True when both stages compiled and their interfaces link.
    pub fn is_ok(&self) -> bool {
        self.diagnostic.is_none()
    }

    /// Link diagnostic, when linking failed. Never empty, bounded.
    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    /// Looks up a uniform location by name.
    pub fn uniform(&self, name: &str) -> Option<UniformLocation> {
        self.uniforms.get(name).copied()
    }

    /// Uniform name table, in no particular order.
    pub fn uniforms(&self) -> impl Iterator<Item = (&str, UniformLocation)> {
        self.uniforms.iter().map(|(name, loc)| (name.as_str(), *loc))
    }

    pub fn vertex_source(&self) -> &str {
        &self.vertex_source
    }

    pub fn fragment_source(&self) -> &str {
        &self.fragment_source
    }

    pub fn vertex_entry(&self) -> &str {
        &self.vertex_entry
    }

    pub fn fragment_entry(&self) -> &str {
        &self.fragment_entry
    }
}

/// Interface checks, in the order a GL-style linker would report them.
fn link_error(vertex: &CompiledStage, fragment: &CompiledStage) -> Option<String> {
    if vertex.kind() != StageKind::Vertex || fragment.kind() != StageKind::Fragment {
        return Some("cannot link: stages attached in the wrong slots".to_string());
    }

    let (v_module, f_module) = match (vertex.module(), fragment.module()) {
        (Some(v), Some(f)) => (v, f),
        (v, f) => {
            let failed = match (v.is_some(), f.is_some()) {
                (false, false) => "vertex and fragment stages",
                (false, true) => "vertex stage",
                _ => "fragment stage",
            };
            return Some(format!("cannot link: {failed} failed to compile"));
        }
    };

    let Some(v_entry) = find_entry(v_module, StageKind::Vertex) else {
        return Some("vertex stage has no vertex entry point".to_string());
    };
    let Some(f_entry) = find_entry(f_module, StageKind::Fragment) else {
        return Some("fragment stage has no fragment entry point".to_string());
    };

    // Attribute interface: the pipeline feeds exactly one vertex buffer,
    // positions at location 0.
    let attributes = binding_locations(v_module, &v_entry.function.arguments);
    if !attributes.contains(&0) {
        return Some("vertex entry point does not consume the position attribute at location 0".to_string());
    }
    if let Some(extra) = attributes.iter().find(|&&loc| loc != 0) {
        return Some(format!("unresolved vertex attribute at location {extra}"));
    }

    // Stage interface: every fragment input must be fed by a vertex output.
    let outputs = result_locations(v_module, v_entry);
    let inputs = binding_locations(f_module, &f_entry.function.arguments);
    if let Some(orphan) = inputs.iter().find(|loc| !outputs.contains(loc)) {
        return Some(format!(
            "mismatched interface: fragment input at location {orphan} has no matching vertex output"
        ));
    }

    // Uniform interface: the pipeline binds a single 4x4 transform in
    // group 0. Anything else would fail device-side pipeline creation, so
    // it is reported here instead.
    let mut uniform_count = 0usize;
    for module in [v_module, f_module] {
        for (_, var) in module.global_variables.iter() {
            if var.space != naga::AddressSpace::Uniform {
                continue;
            }
            uniform_count += 1;
            if uniform_count > 1 {
                return Some("cannot link: more than one uniform variable declared".to_string());
            }
            let name = var.name.as_deref().unwrap_or("<unnamed>");
            match var.binding {
                Some(binding) if binding.group == 0 => {}
                _ => {
                    return Some(format!("uniform \"{name}\" is not bound in group 0"));
                }
            }
            if !is_mat4(module, var.ty) {
                return Some(format!(
                    "uniform \"{name}\" has unsupported type (expected mat4x4<f32>)"
                ));
            }
        }
    }

    None
}

fn find_entry(module: &naga::Module, kind: StageKind) -> Option<&naga::EntryPoint> {
    module
        .entry_points
        .iter()
        .find(|ep| ep.stage == kind.naga_stage())
}

/// Locations bound by a set of entry point arguments, looking through
/// struct-typed arguments whose members carry the bindings.
fn binding_locations(module: &naga::Module, arguments: &[naga::FunctionArgument]) -> Vec<u32> {
    let mut locations = Vec::new();
    for arg in arguments {
        push_locations(module, arg.binding.as_ref(), arg.ty, &mut locations);
    }
    locations
}

/// Locations produced by a vertex entry point's result.
fn result_locations(module: &naga::Module, entry: &naga::EntryPoint) -> Vec<u32> {
    let mut locations = Vec::new();
    if let Some(result) = &entry.function.result {
        push_locations(module, result.binding.as_ref(), result.ty, &mut locations);
    }
    locations
}

fn push_locations(
    module: &naga::Module,
    binding: Option<&naga::Binding>,
    ty: naga::Handle<naga::Type>,
    out: &mut Vec<u32>,
) {
    match binding {
        Some(naga::Binding::Location { location, .. }) => out.push(*location),
        Some(naga::Binding::BuiltIn(_)) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    if let Some(naga::Binding::Location { location, .. }) = &member.binding {
                        out.push(*location);
                    }
                }
            }
        }
    }
}

fn is_mat4(module: &naga::Module, ty: naga::Handle<naga::Type>) -> bool {
    matches!(
        module.types[ty].inner,
        naga::TypeInner::Matrix {
            columns: naga::VectorSize::Quad,
            rows: naga::VectorSize::Quad,
            scalar: naga::Scalar::F32,
        }
    )
}

fn collect_uniforms(module: &naga::Module, table: &mut HashMap<String, UniformLocation>) {
    for (_, var) in module.global_variables.iter() {
        if var.space != naga::AddressSpace::Uniform {
            continue;
        }
        let (Some(name), Some(binding)) = (var.name.as_ref(), var.binding.as_ref()) else {
            continue;
        };
        table.insert(
            name.clone(),
            UniformLocation {
                group: binding.group,
                binding: binding.binding,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::compile::DIAGNOSTIC_LIMIT;

    const VERTEX: &str = r#"
@group(0) @binding(0)
var<uniform> transform: mat4x4<f32>;

@vertex
fn vs_main(@location(0) pos: vec3<f32>) -> @builtin(position) vec4<f32> {
    return transform * vec4<f32>(pos, 1.0);
}
"#;

    const FRAGMENT: &str = r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 0.5, 0.2, 1.0);
}
"#;

    fn compile(source: &str, kind: StageKind) -> CompiledStage {
        CompiledStage::compile(source, kind)
    }

    // ── success ───────────────────────────────────────────────────────────

    #[test]
    fn compatible_stages_link() {
        let program = LinkedProgram::link(
            compile(VERTEX, StageKind::Vertex),
            compile(FRAGMENT, StageKind::Fragment),
        );
        assert!(program.is_ok());
        assert!(program.diagnostic().is_none());
        assert_eq!(program.vertex_entry(), "vs_main");
        assert_eq!(program.fragment_entry(), "fs_main");
    }

    #[test]
    fn uniform_table_maps_name_to_location() {
        let program = LinkedProgram::link(
            compile(VERTEX, StageKind::Vertex),
            compile(FRAGMENT, StageKind::Fragment),
        );
        assert_eq!(
            program.uniform("transform"),
            Some(UniformLocation { group: 0, binding: 0 })
        );
        assert_eq!(program.uniform("missing"), None);
    }

    #[test]
    fn renamed_uniform_still_links() {
        // The transform lookup is by name at draw time; a program with a
        // differently named matrix links fine and simply never receives
        // the per-frame upload.
        let vertex = r#"
@group(0) @binding(0)
var<uniform> mvp: mat4x4<f32>;

@vertex
fn vs_main(@location(0) pos: vec3<f32>) -> @builtin(position) vec4<f32> {
    return mvp * vec4<f32>(pos, 1.0);
}
"#;
        let program = LinkedProgram::link(
            compile(vertex, StageKind::Vertex),
            compile(FRAGMENT, StageKind::Fragment),
        );
        assert!(program.is_ok());
        assert!(program.uniform("transform").is_none());
        assert!(program.uniform("mvp").is_some());
    }

    // ── failed stages ─────────────────────────────────────────────────────

    #[test]
    fn failed_vertex_stage_fails_the_link() {
        let program = LinkedProgram::link(
            compile("void main(){gl_Position=vec4(pos,1.0);}", StageKind::Vertex),
            compile(FRAGMENT, StageKind::Fragment),
        );
        assert!(!program.is_ok());
        let diag = program.diagnostic().expect("diagnostic expected");
        assert!(diag.contains("vertex stage"));
        assert!(diag.len() <= DIAGNOSTIC_LIMIT);
    }

    #[test]
    fn both_failed_stages_are_reported_together() {
        let program = LinkedProgram::link(
            compile("not wgsl", StageKind::Vertex),
            compile("also not wgsl", StageKind::Fragment),
        );
        assert!(!program.is_ok());
        assert!(
            program
                .diagnostic()
                .expect("diagnostic expected")
                .contains("vertex and fragment")
        );
    }

    // ── entry points ──────────────────────────────────────────────────────

    #[test]
    fn empty_vertex_source_fails_at_link() {
        // The loader hands back "" for unreadable files; it compiles to an
        // empty module and the rejection surfaces here.
        let program = LinkedProgram::link(
            compile("", StageKind::Vertex),
            compile(FRAGMENT, StageKind::Fragment),
        );
        assert!(!program.is_ok());
        assert!(
            program
                .diagnostic()
                .expect("diagnostic expected")
                .contains("no vertex entry point")
        );
    }

    #[test]
    fn fragment_source_in_the_vertex_slot_fails() {
        let program = LinkedProgram::link(
            compile(FRAGMENT, StageKind::Vertex),
            compile(FRAGMENT, StageKind::Fragment),
        );
        assert!(!program.is_ok());
        assert!(
            program
                .diagnostic()
                .expect("diagnostic expected")
                .contains("no vertex entry point")
        );
    }

    // ── attribute interface ───────────────────────────────────────────────

    #[test]
    fn vertex_without_position_attribute_fails() {
        let vertex = r#"
@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> @builtin(position) vec4<f32> {
    let x = f32(i32(index) - 1);
    return vec4<f32>(x, 0.5, 0.0, 1.0);
}
"#;
        let program = LinkedProgram::link(
            compile(vertex, StageKind::Vertex),
            compile(FRAGMENT, StageKind::Fragment),
        );
        assert!(!program.is_ok());
        assert!(
            program
                .diagnostic()
                .expect("diagnostic expected")
                .contains("location 0")
        );
    }

    #[test]
    fn extra_vertex_attribute_is_unresolved() {
        let vertex = r#"
@vertex
fn vs_main(
    @location(0) pos: vec3<f32>,
    @location(1) color: vec3<f32>,
) -> @builtin(position) vec4<f32> {
    return vec4<f32>(pos + color * 0.0, 1.0);
}
"#;
        let program = LinkedProgram::link(
            compile(vertex, StageKind::Vertex),
            compile(FRAGMENT, StageKind::Fragment),
        );
        assert!(!program.is_ok());
        assert!(
            program
                .diagnostic()
                .expect("diagnostic expected")
                .contains("unresolved vertex attribute at location 1")
        );
    }

    // ── stage interface ───────────────────────────────────────────────────

    #[test]
    fn orphan_fragment_input_fails() {
        let fragment = r#"
@fragment
fn fs_main(@location(0) tint: vec4<f32>) -> @location(0) vec4<f32> {
    return tint;
}
"#;
        let program = LinkedProgram::link(
            compile(VERTEX, StageKind::Vertex),
            compile(fragment, StageKind::Fragment),
        );
        assert!(!program.is_ok());
        assert!(
            program
                .diagnostic()
                .expect("diagnostic expected")
                .contains("mismatched interface")
        );
    }

    #[test]
    fn matching_stage_io_links() {
        let vertex = r#"
struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) tint: vec4<f32>,
}

@vertex
fn vs_main(@location(0) pos: vec3<f32>) -> VertexOutput {
    var out: VertexOutput;
    out.position = vec4<f32>(pos, 1.0);
    out.tint = vec4<f32>(1.0);
    return out;
}
"#;
        let fragment = r#"
@fragment
fn fs_main(@location(0) tint: vec4<f32>) -> @location(0) vec4<f32> {
    return tint;
}
"#;
        let program = LinkedProgram::link(
            compile(vertex, StageKind::Vertex),
            compile(fragment, StageKind::Fragment),
        );
        assert!(program.is_ok());
    }

    // ── uniform interface ─────────────────────────────────────────────────

    #[test]
    fn non_matrix_uniform_fails() {
        let vertex = r#"
@group(0) @binding(0)
var<uniform> offset: vec4<f32>;

@vertex
fn vs_main(@location(0) pos: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(pos, 1.0) + offset;
}
"#;
        let program = LinkedProgram::link(
            compile(vertex, StageKind::Vertex),
            compile(FRAGMENT, StageKind::Fragment),
        );
        assert!(!program.is_ok());
        assert!(
            program
                .diagnostic()
                .expect("diagnostic expected")
                .contains("unsupported type")
        );
    }

    #[test]
    fn uniform_outside_group_zero_fails() {
        let vertex = r#"
@group(1) @binding(0)
var<uniform> transform: mat4x4<f32>;

@vertex
fn vs_main(@location(0) pos: vec3<f32>) -> @builtin(position) vec4<f32> {
    return transform * vec4<f32>(pos, 1.0);
}
"#;
        let program = LinkedProgram::link(
            compile(vertex, StageKind::Vertex),
            compile(FRAGMENT, StageKind::Fragment),
        );
        assert!(!program.is_ok());
        assert!(
            program
                .diagnostic()
                .expect("diagnostic expected")
                .contains("group 0")
        );
    }
}
