//! Diff engine.
//!
//! Compares a desired resource with its resolved remote record and produces
//! the update options to send, whether an update is needed at all, and a
//! human-readable delta with one line per differing field.

use super::policy::{policy_for, same_address};
use crds::{AddressPoolSpec, NetworkType, PlatformNetworkSpec};
use inventory_client::{
    AddressPool as RemoteAddressPool, AddressPoolOpts, AddressRange, FieldUpdate, Network as RemoteNetwork,
    NetworkOpts,
};
use std::fmt::Display;

/// Accumulates delta lines
#[derive(Debug, Default)]
struct DeltaReport {
    lines: Vec<String>,
}

impl DeltaReport {
    fn add(&mut self, label: &str, value: impl Display) {
        self.lines.push(format!("\t{}: {}", label, value));
    }

    fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Empty when nothing differs, otherwise a leading newline followed by the
    /// lines
    fn finish(self) -> String {
        if self.lines.is_empty() {
            String::new()
        } else {
            format!("\n{}", self.lines.join("\n"))
        }
    }
}

/// Result of comparing a PlatformNetwork with the system
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkDiff {
    pub opts: NetworkOpts,
    pub update_required: bool,
    /// Identifier of the resolved remote record, `None` when it must be created
    pub remote_id: Option<String>,
    pub delta: String,
}

/// Result of comparing an AddressPool with the system
#[derive(Debug, Clone, PartialEq)]
pub struct AddressPoolDiff {
    pub opts: AddressPoolOpts,
    pub update_required: bool,
    pub remote_id: Option<String>,
    pub delta: String,
}

pub fn diff_network(name: &str, spec: &PlatformNetworkSpec, remote: Option<&RemoteNetwork>) -> NetworkDiff {
    let mut delta = DeltaReport::default();
    let mut opts = NetworkOpts::default();

    if remote.is_none_or(|r| r.name != name) {
        opts.name = Some(name.to_string());
        delta.add("+Name", name);
    }

    let network_type = spec.network_type.as_str();
    if remote.is_none_or(|r| r.network_type != network_type) {
        opts.network_type = Some(network_type.to_string());
        delta.add("+Type", network_type);
    }

    if remote.is_none_or(|r| r.dynamic != spec.dynamic) {
        opts.dynamic = Some(spec.dynamic);
        delta.add("+Dynamic", spec.dynamic);
    }

    NetworkDiff {
        update_required: !opts.is_empty(),
        opts,
        remote_id: remote.map(|r| r.uuid.clone()),
        delta: delta.finish(),
    }
}

/// Add/change/remove comparison of one optional address.
///
/// `remote` is `None` when there is no remote record at all.
fn diff_optional_address(
    delta: &mut DeltaReport,
    set_label: &str,
    clear_label: &str,
    desired: Option<&String>,
    remote: Option<Option<&String>>,
) -> FieldUpdate<String> {
    match (desired, remote) {
        (Some(wanted), current) => {
            let unchanged = matches!(current, Some(Some(actual)) if same_address(wanted, actual));
            if unchanged {
                FieldUpdate::Unchanged
            } else {
                delta.add(set_label, wanted);
                FieldUpdate::Set(wanted.clone())
            }
        }
        (None, Some(Some(actual))) => {
            delta.add(clear_label, actual);
            FieldUpdate::Clear
        }
        (None, _) => FieldUpdate::Unchanged,
    }
}

pub fn diff_address_pool(
    network_type: NetworkType,
    name: &str,
    spec: &AddressPoolSpec,
    remote: Option<&RemoteAddressPool>,
) -> AddressPoolDiff {
    let mut delta = DeltaReport::default();
    let mut opts = AddressPoolOpts::default();

    if remote.is_none_or(|r| r.name != name) {
        opts.name = Some(name.to_string());
        delta.add("+Name", name);
    }

    if remote.is_none_or(|r| !same_address(&spec.subnet, &r.network)) {
        opts.network = Some(spec.subnet.clone());
        delta.add("+Network", &spec.subnet);
    }

    if remote.is_none_or(|r| r.prefix != spec.prefix) {
        opts.prefix = Some(spec.prefix);
        delta.add("+Prefix", spec.prefix);
    }

    opts.floating_address = diff_optional_address(
        &mut delta,
        "+Floating Address",
        "-Floating Address",
        spec.floating_address.as_ref(),
        remote.map(|r| r.floating_address.as_ref()),
    );
    opts.controller0_address = diff_optional_address(
        &mut delta,
        "+Controller0 Address",
        "-Controller0 Address",
        spec.controller0_address.as_ref(),
        remote.map(|r| r.controller0_address.as_ref()),
    );
    opts.controller1_address = diff_optional_address(
        &mut delta,
        "+Controller1 Address",
        "-Controller1 Address",
        spec.controller1_address.as_ref(),
        remote.map(|r| r.controller1_address.as_ref()),
    );

    if policy_for(network_type).manages_gateway {
        opts.gateway_address = diff_optional_address(
            &mut delta,
            "+Gateway",
            "-Gateway Address",
            spec.gateway.as_ref(),
            remote.map(|r| r.gateway_address.as_ref()),
        );
    }

    // A remote order the spec does not mention is left alone
    if let Some(order) = &spec.allocation.order {
        if remote.is_none_or(|r| r.order.as_deref() != Some(order.as_str())) {
            opts.order = Some(order.clone());
            delta.add("+Order", order);
        }
    }

    if !spec.allocation.ranges.is_empty() {
        let ranges: Vec<AddressRange> = spec
            .allocation
            .ranges
            .iter()
            .map(|r| AddressRange::new(r.start.clone(), r.end.clone()))
            .collect();
        if remote.is_none_or(|r| !compare_ranges(&ranges, &r.ranges)) {
            delta.add("+Ranges", format_ranges(&ranges));
            opts.ranges = Some(ranges);
        }
    }

    AddressPoolDiff {
        opts,
        update_required: !delta.is_empty(),
        remote_id: remote.map(|r| r.uuid.clone()),
        delta: delta.finish(),
    }
}

/// Range list equality as the system has always applied it: equal lengths,
/// and the number of (desired, remote) pairs with matching start and end
/// (ignoring case) equals the number of desired ranges. Duplicates on one side
/// can therefore make unequal lists compare equal.
pub fn compare_ranges(desired: &[AddressRange], remote: &[AddressRange]) -> bool {
    if desired.len() != remote.len() {
        return false;
    }

    let matches: usize = desired
        .iter()
        .map(|d| {
            remote
                .iter()
                .filter(|r| d.start().eq_ignore_ascii_case(r.start()) && d.end().eq_ignore_ascii_case(r.end()))
                .count()
        })
        .sum();

    matches == desired.len()
}

/// `[[start end] [start end]]`
fn format_ranges(ranges: &[AddressRange]) -> String {
    let inner: Vec<String> = ranges.iter().map(|r| format!("[{} {}]", r.start(), r.end())).collect();
    format!("[{}]", inner.join(" "))
}
