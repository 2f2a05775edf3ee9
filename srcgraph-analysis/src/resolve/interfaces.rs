//! Interface implementation detection.
//!
//! A struct implements an interface when it carries a method with the
//! same name and identical canonical signature string for every method
//! the interface lists. Signature strings exclude parameter names, so
//! declared and interface-listed forms compare equal.

use tracing::debug;

use crate::extract::PendingResolution;
use crate::metadata::{InterfaceResolution, Metadata, TypeKind};

/// Compute the symmetric `implements`/`implemented_by` closure across
/// every package.
pub fn resolve_interfaces(meta: &mut Metadata) {
    struct IfaceRow {
        pkg: String,
        name: String,
        methods: Vec<(i32, i32)>,
    }
    struct ImplRow {
        pkg: String,
        name: String,
        methods: Vec<(i32, i32)>,
    }

    let mut interfaces: Vec<IfaceRow> = Vec::new();
    let mut candidates: Vec<ImplRow> = Vec::new();
    for (pkg_path, pkg) in &meta.packages {
        for (type_name, typ) in &pkg.types {
            let methods: Vec<(i32, i32)> = typ
                .methods
                .iter()
                .map(|m| (m.name, m.signature_str))
                .collect();
            match typ.kind {
                TypeKind::Interface => interfaces.push(IfaceRow {
                    pkg: pkg_path.clone(),
                    name: type_name.clone(),
                    methods,
                }),
                TypeKind::Alias => {}
                _ => {
                    if !methods.is_empty() {
                        candidates.push(ImplRow {
                            pkg: pkg_path.clone(),
                            name: type_name.clone(),
                            methods,
                        });
                    }
                }
            }
        }
    }

    let mut matches: Vec<(String, String, String, String)> = Vec::new();
    for iface in &interfaces {
        if iface.methods.is_empty() {
            continue;
        }
        for cand in &candidates {
            let satisfied = iface.methods.iter().all(|(name, sig)| {
                cand.methods
                    .iter()
                    .any(|(cn, cs)| cn == name && cs == sig)
            });
            if satisfied {
                matches.push((
                    iface.pkg.clone(),
                    iface.name.clone(),
                    cand.pkg.clone(),
                    cand.name.clone(),
                ));
            }
        }
    }

    for (ipkg, iname, spkg, sname) in matches {
        let iface_full = meta.intern(&format!("{ipkg}.{iname}"));
        let struct_full = meta.intern(&format!("{spkg}.{sname}"));
        if let Some(typ) = meta
            .packages
            .get_mut(&spkg)
            .and_then(|p| p.types.get_mut(&sname))
        {
            if !typ.implements.contains(&iface_full) {
                typ.implements.push(iface_full);
            }
        }
        if let Some(typ) = meta
            .packages
            .get_mut(&ipkg)
            .and_then(|p| p.types.get_mut(&iname))
        {
            if !typ.implemented_by.contains(&struct_full) {
                typ.implemented_by.push(struct_full);
            }
        }
    }
    debug!(interfaces = interfaces.len(), "interface closure computed");
}

/// Register the interface→concrete resolutions observed at struct-literal
/// sites during harvesting. Keyed by `(interface, struct)` within the
/// package.
pub(crate) fn apply_pending_resolutions(meta: &mut Metadata, pending: Vec<PendingResolution>) {
    for p in pending {
        let interface_type = meta.intern(&p.interface_field);
        let struct_type = meta.intern(&p.owning_type);
        let pkg_id = meta.intern(&p.pkg);
        let concrete_type = meta.intern(&p.concrete);
        let key = format!("{}.{}", p.interface_field, p.owning_type);
        let pkg = meta.packages.entry(p.pkg.clone()).or_default();
        pkg.interface_resolutions
            .entry(key)
            .or_insert(InterfaceResolution {
                interface_type,
                struct_type,
                pkg: pkg_id,
                concrete_type,
                position: p.position,
            });
    }
}
