//! OS-specific glue. ko6 is the only target this crate runs on, but the
//! module split mirrors how a libc would separate `os::unix`/`os::windows`
//! so a second target would slot in beside `ko6` rather than displace it.

pub mod ko6;
