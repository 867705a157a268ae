//! Platform catalog and static resource table
//!
//! Every platform owns exactly one spreadsheet dataset and one note file.
//! Locators are built once at startup from the static table below and the
//! configured base path, and never change afterwards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Virtualization or cloud platform shown as one viewer tab
///
/// Declaration order is tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "vmware")]
    VMware,
    #[serde(rename = "hyper-v")]
    HyperV,
    #[serde(rename = "nutanix-ahv")]
    NutanixAhv,
    #[serde(rename = "nutanix-esxi")]
    NutanixEsxi,
    #[serde(rename = "aws")]
    Aws,
    #[serde(rename = "azure")]
    Azure,
    #[serde(rename = "proxmox")]
    Proxmox,
}

impl Platform {
    /// All platforms in tab order
    pub const ALL: [Platform; 7] = [
        Platform::VMware,
        Platform::HyperV,
        Platform::NutanixAhv,
        Platform::NutanixEsxi,
        Platform::Aws,
        Platform::Azure,
        Platform::Proxmox,
    ];

    /// Position in [`Platform::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Human-readable tab label
    pub fn label(self) -> &'static str {
        match self {
            Platform::VMware => "VMware",
            Platform::HyperV => "Hyper-V",
            Platform::NutanixAhv => "Nutanix AHV",
            Platform::NutanixEsxi => "Nutanix ESXi",
            Platform::Aws => "AWS",
            Platform::Azure => "Azure",
            Platform::Proxmox => "Proxmox",
        }
    }

    /// URL-safe identifier used in API paths
    pub fn slug(self) -> &'static str {
        match self {
            Platform::VMware => "vmware",
            Platform::HyperV => "hyper-v",
            Platform::NutanixAhv => "nutanix-ahv",
            Platform::NutanixEsxi => "nutanix-esxi",
            Platform::Aws => "aws",
            Platform::Azure => "azure",
            Platform::Proxmox => "proxmox",
        }
    }

    fn dataset_path(self) -> &'static str {
        match self {
            Platform::VMware => "/data/Sizing-VMWare.xlsx",
            Platform::HyperV => "/data/Sizing-hyperv.xlsx",
            Platform::NutanixAhv => "/data/Sizing-Nutanix-AHV.xlsx",
            Platform::NutanixEsxi => "/data/Sizing-Nutanix-ESXi.xlsx",
            Platform::Aws => "/data/Sizing-AWS.xlsx",
            Platform::Azure => "/data/Sizing-Azure.xlsx",
            Platform::Proxmox => "/data/Sizing-Proxmox.xlsx",
        }
    }

    fn note_path(self) -> &'static str {
        match self {
            Platform::VMware => "/notes-vmware.txt",
            Platform::HyperV => "/notes-hyperv.txt",
            Platform::NutanixAhv => "/notes-nutanix-ahv.txt",
            Platform::NutanixEsxi => "/notes-nutanix-esxi.txt",
            Platform::Aws => "/notes-aws.txt",
            Platform::Azure => "/notes-azure.txt",
            Platform::Proxmox => "/notes-proxmox.txt",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts either the slug or the label, case-insensitively
impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Platform::ALL
            .into_iter()
            .find(|p| p.slug().eq_ignore_ascii_case(wanted) || p.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::UnknownPlatform(s.to_string()))
    }
}

/// Kind of resource a descriptor points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Spreadsheet workbook
    Dataset,
    /// Plain-text note file
    Note,
}

/// One fetchable resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub platform: Platform,
    pub kind: ResourceKind,
    pub locator: String,
}

/// Static set of resource descriptors, one per platform per kind
#[derive(Debug, Clone)]
pub struct ResourceCatalog {
    base_path: String,
    datasets: Vec<ResourceDescriptor>,
    notes: Vec<ResourceDescriptor>,
}

impl ResourceCatalog {
    /// Build the catalog with `base_path` prepended to every locator
    ///
    /// `base_path` is expected to be normalized already
    /// (see [`crate::config::normalize_base_path`]).
    pub fn new(base_path: &str) -> Self {
        let describe = |platform: Platform, kind: ResourceKind| {
            let path = match kind {
                ResourceKind::Dataset => platform.dataset_path(),
                ResourceKind::Note => platform.note_path(),
            };
            ResourceDescriptor {
                platform,
                kind,
                locator: format!("{}{}", base_path, path),
            }
        };

        Self {
            base_path: base_path.to_string(),
            datasets: Platform::ALL
                .into_iter()
                .map(|p| describe(p, ResourceKind::Dataset))
                .collect(),
            notes: Platform::ALL
                .into_iter()
                .map(|p| describe(p, ResourceKind::Note))
                .collect(),
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Locator for one platform's resource of the given kind
    pub fn locator(&self, platform: Platform, kind: ResourceKind) -> &str {
        let descriptors = match kind {
            ResourceKind::Dataset => &self.datasets,
            ResourceKind::Note => &self.notes,
        };
        // Both vectors are built from Platform::ALL, so the index always exists
        &descriptors[platform.index()].locator
    }

    pub fn datasets(&self) -> &[ResourceDescriptor] {
        &self.datasets
    }

    pub fn notes(&self) -> &[ResourceDescriptor] {
        &self.notes
    }
}
