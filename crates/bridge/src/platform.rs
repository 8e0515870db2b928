//! Identification of the target operating system.

use std::fmt;

/// Target operating system family and the compiler macros that identify it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
	pub name: &'static str,
	pub markers: Vec<&'static str>,
}

const UNIDENTIFIED: &str = "Unidentified operating system.";

impl Platform {
	/// Identifies the platform this crate was built for.
	///
	/// Markers are checked in a fixed order; the last one that names a
	/// platform decides `name`. HP-UX has no Rust target and is never reported.
	pub fn identify() -> Self {
		let checks: [(bool, &'static str, Option<&'static str>); 13] = [
			(cfg!(windows), "_WIN32", Some("Windows")),
			(cfg!(target_vendor = "apple"), "__APPLE__", Some("macOS")),
			(cfg!(target_os = "linux"), "__linux__", Some("Linux")),
			(cfg!(target_os = "ios"), "TARGET_OS_IPHONE", Some("iOS")),
			(cfg!(target_os = "macos"), "TARGET_OS_MAC", Some("macOS")),
			(cfg!(target_os = "android"), "__ANDROID__", Some("Android")),
			(cfg!(all(unix, not(target_vendor = "apple"))), "__unix__", None),
			(cfg!(unix), "_POSIX_VERSION", None),
			(cfg!(target_os = "solaris"), "__sun", Some("Solaris")),
			(cfg!(target_os = "dragonfly"), "__DragonFly__", Some("BSD")),
			(cfg!(target_os = "freebsd"), "__FreeBSD__", Some("BSD")),
			(cfg!(target_os = "netbsd"), "__NetBSD__", Some("BSD")),
			(cfg!(target_os = "openbsd"), "__OpenBSD__", Some("BSD")),
		];

		let mut name = UNIDENTIFIED;
		let mut markers = Vec::new();
		for (defined, marker, platform) in checks {
			if !defined {
				continue;
			}
			markers.push(marker);
			if let Some(platform) = platform {
				name = platform;
			}
		}
		Self { name, markers }
	}

	/// Space-joined marker list.
	pub fn macros(&self) -> String {
		self.markers.join(" ")
	}
}

impl fmt::Display for Platform {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} ({})", self.name, self.macros())
	}
}
