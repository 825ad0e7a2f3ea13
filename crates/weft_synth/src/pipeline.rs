//! The build pass: ordering, cache coherency and per-component synthesis.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::Path;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{debug, info, warn};
use weft_cache::{Cache, CacheError, Freshness};
use weft_codemodel::JavaRenderer;
use weft_common::{ContentHash, InternalError, WeftResult};
use weft_config::CacheConfig;
use weft_diagnostics::{Diagnostic, Target};
use weft_model::{ComponentId, Program};

use crate::bindings::ViewHierarchy;
use crate::codes;
use crate::error::MemberError;
use crate::options::SynthOptions;
use crate::registry::DirectiveRegistry;
use crate::resolver::VirtualMemberResolver;
use crate::session::BuildSession;

/// What one pass produced.
#[derive(Debug, Default)]
pub struct PassOutput {
    /// Rendered sources keyed by generated class name.
    pub artifacts: BTreeMap<String, String>,
    /// Every diagnostic of the pass.
    pub diagnostics: Vec<Diagnostic>,
    /// Artifacts whose cache entry is invalid; only a full rebuild brings
    /// them back.
    pub stale: Vec<String>,
    /// Components whose stored source was reused.
    pub reused: usize,
    /// Components synthesized this pass.
    pub generated: usize,
}

impl PassOutput {
    /// Returns `true` if any error-severity diagnostic was reported.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == weft_diagnostics::Severity::Error)
    }
}

/// Opens the cache configured for the project at `project_dir`.
pub fn open_cache(project_dir: &Path, config: &CacheConfig, version: &str) -> Cache {
    if config.enabled {
        Cache::load_or_create(&project_dir.join(&config.dir), version)
    } else {
        Cache::in_memory(version)
    }
}

fn unexpected(err: CacheError) -> InternalError {
    InternalError::new(format!("cache out of sync with the pass: {err}"))
}

/// Runs one build pass over `program`.
///
/// Components are processed dependencies first. A component whose cache
/// entry is invalid, or becomes invalid by observing a dependency outside
/// its recorded set, is reported and left ungenerated. A valid entry whose
/// stored source was generated from the same inputs is reused.
pub fn run_pass(
    program: &Program,
    options: &SynthOptions,
    hierarchy: &dyn ViewHierarchy,
    cache: &mut Cache,
) -> WeftResult<PassOutput> {
    let registry = DirectiveRegistry::new(options);
    let resolver = VirtualMemberResolver::new(program, &registry);
    let mut session = BuildSession::new(program, options, hierarchy);
    let mut output = PassOutput::default();
    let artifact_of: HashMap<ComponentId, String> = program
        .components()
        .map(|(id, c)| (id, options.generated_for(c)))
        .collect();

    info!(components = program.component_count(), "pass started");
    if options.full_rebuild {
        cache.deps_mut().reset();
    }

    let options_digest = options.digest()?;
    let present: HashSet<String> = artifact_of.values().cloned().collect();
    let mut invalidated = cache.deps_mut().retain_present(&present);
    for (id, _) in program.components() {
        let fingerprint = program.fingerprint(id);
        invalidated.extend(
            cache
                .deps_mut()
                .observe_fingerprint(&artifact_of[&id], fingerprint),
        );
    }
    let mut reported = HashSet::new();
    for dependent in invalidated {
        let reason = cache
            .deps()
            .get_entry(&dependent)
            .ok()
            .and_then(|e| e.needs_rebuild.clone())
            .unwrap_or_else(|| "an upstream component changed".to_string());
        if reported.insert(dependent.clone()) {
            session.report(
                MemberError::upstream_changed(reason),
                Target::component(dependent),
            );
        }
    }

    let mut rendered = Vec::new();
    for id in processing_order(program, &resolver) {
        let component = program.component(id);
        let artifact = &artifact_of[&id];
        let upstream: BTreeSet<&String> = resolver
            .referenced_components(id)
            .into_iter()
            .map(|r| &artifact_of[&r])
            .collect();

        let had_entry =
            cache.deps().has_entry(artifact) && !cache.deps().created_this_pass(artifact);
        if had_entry {
            if cache.deps().is_valid(artifact) {
                for up in &upstream {
                    let freshness = cache
                        .deps_mut()
                        .check_freshness(artifact, up)
                        .map_err(unexpected)?;
                    if freshness == Freshness::Invalidated {
                        session.report(
                            MemberError::dependency_added(up),
                            Target::component(artifact.clone()),
                        );
                        reported.insert(artifact.clone());
                        break;
                    }
                }
            }
            if !cache.deps().is_valid(artifact) {
                if reported.insert(artifact.clone()) {
                    let reason = cache
                        .deps()
                        .get_entry(artifact)
                        .map_err(unexpected)?
                        .needs_rebuild
                        .clone()
                        .unwrap_or_else(|| "the cache entry was invalidated".to_string());
                    session.report(
                        MemberError::upstream_changed(reason),
                        Target::component(artifact.clone()),
                    );
                }
                warn!(artifact = %artifact, "stale artifact left ungenerated");
                output.stale.push(artifact.clone());
                continue;
            }
        }

        for up in &upstream {
            cache.deps_mut().record_dependency(artifact, up);
        }
        cache.deps_mut().ensure_entry(artifact);

        let inputs = component_inputs(program, hierarchy, &resolver, id, options_digest)?;
        if had_entry {
            if let Some(source) = cache.load_source(artifact, inputs) {
                debug!(artifact = %artifact, "reused stored source");
                output.artifacts.insert(artifact.clone(), source);
                output.reused += 1;
                continue;
            }
        }

        let errors_before = session.sink().error_count();
        let resolution = resolver.resolve(id, session.sink())?;
        if resolution.is_empty() {
            debug!(component = %component.name, "no directives to synthesize");
            continue;
        }
        registry.run(&mut session, id, &resolution)?;
        let clean = session.sink().error_count() == errors_before;
        rendered.push((artifact.clone(), clean, inputs));
        output.generated += 1;
    }

    let (code, diagnostics) = session.finish();
    output.diagnostics = diagnostics;
    let renderer = JavaRenderer::default();
    for (artifact, clean, inputs) in rendered {
        let Some(class) = code.by_name(&artifact) else {
            continue;
        };
        let source = renderer.render_class(class);
        if clean {
            if let Err(err) = cache.store_source(&artifact, &source, inputs) {
                output.diagnostics.push(cache_write_failed(&artifact, &err));
            }
        }
        output.artifacts.insert(artifact, source);
    }

    if let Err(err) = cache.save() {
        output.diagnostics.push(cache_write_failed("cache", &err));
    }
    info!(
        generated = output.generated,
        reused = output.reused,
        stale = output.stale.len(),
        diagnostics = output.diagnostics.len(),
        "pass finished"
    );
    Ok(output)
}

fn cache_write_failed(what: &str, err: &CacheError) -> Diagnostic {
    warn!(%err, "cache write failed");
    Diagnostic::warning(
        codes::CACHE_WRITE_FAILED,
        format!("could not write the cache: {err}"),
        Target::component(what.to_string()),
    )
}

/// Digest of everything the generated code of `id` derives from: its
/// declared members, the synthesis options, and the view bindings of every
/// field it or a referenced component declares.
fn component_inputs(
    program: &Program,
    hierarchy: &dyn ViewHierarchy,
    resolver: &VirtualMemberResolver<'_>,
    id: ComponentId,
    options: ContentHash,
) -> WeftResult<ContentHash> {
    let host = &program.component(id).name;
    let mut bindings = BTreeMap::new();
    for scope in std::iter::once(id).chain(resolver.referenced_components(id)) {
        for (_, member) in program.members_of(scope).filter(|(_, m)| m.is_field()) {
            let slots = hierarchy.slots(host, &member.name);
            if !slots.is_empty() {
                bindings.insert(member.name.as_str(), slots);
            }
        }
    }
    let bindings = serde_json::to_vec(&bindings)
        .map_err(|e| InternalError::new(format!("cannot digest bindings of `{host}`: {e}")))?;
    let members = program.fingerprint(id).to_string();
    let options = options.to_string();
    Ok(ContentHash::from_parts([
        members.as_bytes(),
        options.as_bytes(),
        bindings.as_slice(),
    ]))
}

/// Components ordered so every component follows the ones it references.
/// Reference cycles are processed together in declaration order.
fn processing_order(
    program: &Program,
    resolver: &VirtualMemberResolver<'_>,
) -> Vec<ComponentId> {
    let mut graph: DiGraph<ComponentId, ()> = DiGraph::new();
    let nodes: HashMap<ComponentId, NodeIndex> = program
        .components()
        .map(|(id, _)| (id, graph.add_node(id)))
        .collect();
    for (id, _) in program.components() {
        for target in resolver.referenced_components(id) {
            if target != id {
                graph.update_edge(nodes[&id], nodes[&target], ());
            }
        }
    }
    // Strongly connected components come out in reverse topological order,
    // which for `referrer -> referenced` edges is dependencies first.
    tarjan_scc(&graph)
        .into_iter()
        .flat_map(|mut scc| {
            scc.sort();
            scc.into_iter().map(|n| graph[n])
        })
        .collect()
}
