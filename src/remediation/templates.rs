//! # Remediation Templates
//!
//! @title Remediation Index Templates
//! @author Ramprasad
//!
//! Handlebars templates for the `remediation.md` index written next to the
//! generated `.patch` files.

/// Name under which [`INDEX_TEMPLATE`] is registered.
pub const INDEX: &str = "remediation_index";

/// Index of all generated patches.
pub const INDEX_TEMPLATE: &str = r#"# Script Injection Remediation

Generated by actions-sentinel {{version}}.

{{#if patches}}
Apply a patch from the repository root with `git apply <file>` or `patch -p1 < <file>`.
Each patch is generated against the original workflow, so patches touching the
same file should be applied one at a time and the scan re-run in between.

| Patch | Workflow | Line | Variable |
|-------|----------|------|----------|
{{#each patches}}
| [{{file_name}}]({{file_name}}) | `{{workflow}}` | {{line}} | `{{env_name}}` |
{{/each}}
{{else}}
No automated remediation was available for the findings of this scan.
{{/if}}
{{#if unpatched}}

## Findings without a patch

{{#each unpatched}}
- `{{location}}`: `{{expression}}`
{{/each}}
{{/if}}
"#;
