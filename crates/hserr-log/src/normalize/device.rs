use serde::{Deserialize, Serialize};

/// Storage class behind a mapped file, derived from the `major:minor` device
/// column of a `/proc/<pid>/maps` row and path markers.
///
/// Auxiliary metadata only: it never influences event typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Device {
    FixedDisk,
    Nfs,
    ScsiDisk,
    CloudBlockStorage,
    Unknown,
}

const NFS_MARKERS: &[&str] = &["/nfs/", "/net/", "/nfs-", ".nfs"];

impl Device {
    /// Classifies a device column (`fd:00`, `08:01`, `103:02`) together with
    /// the mapped path.
    pub fn classify(device: &str, path: &str) -> Device {
        let Some(major) = device
            .split(':')
            .next()
            .and_then(|m| u32::from_str_radix(m.trim(), 16).ok())
        else {
            return Device::Unknown;
        };
        match major {
            // Anonymous majors cover NFS but also tmpfs, overlayfs, procfs...
            0 if NFS_MARKERS.iter().any(|m| path.contains(m)) => Device::Nfs,
            0 => Device::Unknown,
            // sd*: classic and extended SCSI disk majors.
            0x08 | 0x41..=0x47 | 0x80..=0x87 => Device::ScsiDisk,
            // xvd* (Xen) and blkext (NVMe, the EBS Nitro attachment).
            0xca | 0x103 => Device::CloudBlockStorage,
            // IDE hd*, md raid, device-mapper and virtio.
            0x03 | 0x16 | 0x09 | 0xfc | 0xfd | 0xfe => Device::FixedDisk,
            _ => Device::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_majors() {
        assert_eq!(Device::classify("fd:00", "/usr/lib/jvm/java/bin/java"), Device::FixedDisk);
        assert_eq!(Device::classify("08:01", "/opt/app/lib.so"), Device::ScsiDisk);
        assert_eq!(Device::classify("ca:01", "/opt/app/lib.so"), Device::CloudBlockStorage);
        assert_eq!(Device::classify("103:02", "/opt/app/lib.so"), Device::CloudBlockStorage);
    }

    #[test]
    fn test_nfs_needs_path_marker() {
        assert_eq!(Device::classify("00:2b", "/mnt/nfs/share/app.jar"), Device::Nfs);
        assert_eq!(Device::classify("00:05", "/dev/shm/x"), Device::Unknown);
    }

    #[test]
    fn test_garbage_is_unknown() {
        assert_eq!(Device::classify("zz:00", "/x"), Device::Unknown);
        assert_eq!(Device::classify("", ""), Device::Unknown);
    }
}
