//! Per-module pipeline: rewrite passes, comment attachment, printing.
//!
//! The pass order matters. Switch reconstruction runs on the raw lowered
//! shape before anything inserts nodes between its statements; casts are
//! computed on normalized delegate types; renaming comes after every pass
//! that surfaces synthetic names; comments attach to the final tree.

use crate::comment_attachment::attach_comments;
use crate::emit_context::{EmitContext, TranspileOptions};
use crate::emitter::Printer;
use crate::transforms::{
    BooleanCoercion, CallableTypeNormalizer, CastInjector, ClosureCaptureRewriter,
    ReservedWordRenamer, SwitchReconstructor, ValueTypeAssignmentExpander,
    fix_top_level_visibility,
};
use thiserror::Error;
use tracing::{debug, info};
use usc_ast::ResolvedModule;
use usc_common::{CommentIndex, ModuleDiagnostics};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{file}: {count} upstream error(s), first: {first}")]
    UpstreamErrors {
        file: String,
        count: usize,
        first: String,
    },
    #[error("{file}: module root is not a node of the tree")]
    InvalidRoot { file: String },
}

/// Text and diagnostics of one module.
#[derive(Clone, Debug)]
pub struct ModuleOutput {
    pub text: String,
    pub diagnostics: ModuleDiagnostics,
}

/// Transform and print one module. The tree is rewritten in place.
#[tracing::instrument(level = "info", skip_all, fields(file = %module.file_name))]
pub fn transpile_module(
    module: &mut ResolvedModule,
    options: &TranspileOptions,
) -> Result<ModuleOutput, PipelineError> {
    let file_name = module.file_name.clone();
    if module.arena.get(module.root).is_none() {
        return Err(PipelineError::InvalidRoot { file: file_name });
    }

    let mut ctx = EmitContext::new(file_name.clone(), options.clone());
    if let Some(first) = module.upstream_errors.first() {
        if !options.best_effort {
            return Err(PipelineError::UpstreamErrors {
                file: file_name,
                count: module.upstream_errors.len(),
                first: first.clone(),
            });
        }
        for error in &module.upstream_errors {
            ctx.diagnostics.warn(format!("upstream error: {error}"), None);
        }
    }

    let comments = if options.remove_comments {
        CommentIndex::new()
    } else {
        CommentIndex::scan(&module.source_text)
    };

    let root = module.root;
    let arena = &mut module.arena;

    let switches = SwitchReconstructor::new(arena, &mut ctx).run(root);
    let captures = ClosureCaptureRewriter::new(arena, &mut ctx).run(root);
    let expansions = ValueTypeAssignmentExpander::new(arena, &mut ctx).run(root);
    let delegates = CallableTypeNormalizer::new(arena, &mut ctx).run(root);
    let casts = CastInjector::new(arena, &mut ctx).run(root);
    let coercions = BooleanCoercion::new(arena, &mut ctx).run(root);
    let renames = ReservedWordRenamer::new(arena, &mut ctx).run(root);
    let visibility = fix_top_level_visibility(arena, root);
    debug!(
        switches,
        captures, expansions, delegates, casts, coercions, renames, visibility, "passes complete"
    );

    if !options.remove_comments {
        attach_comments(arena, root, &comments, &mut ctx);
    }

    let text = Printer::new(arena, &comments, &mut ctx).print_module(root);
    info!(
        bytes = text.len(),
        diagnostics = ctx.diagnostics.len(),
        "module emitted"
    );

    Ok(ModuleOutput {
        text,
        diagnostics: ctx.diagnostics,
    })
}
