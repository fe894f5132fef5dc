//! Fixed policy tables: denial rules and write-intent signatures.
//!
//! Both tables are ordered and built once per process. All patterns are
//! case-insensitive and matched anywhere in the raw command string, so a
//! dangerous sequence is caught inside pipelines, subshells and `&&` chains.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// A destructive-operation signature and the reason reported when it fires.
pub struct DenialRule {
    pattern: Regex,
    reason: &'static str,
}

impl DenialRule {
    /// The regular expression source of this rule.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Human-readable explanation shown to the caller.
    pub fn reason(&self) -> &'static str {
        self.reason
    }

    pub(crate) fn is_match(&self, command: &str) -> bool {
        self.pattern.is_match(command)
    }
}

impl fmt::Debug for DenialRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DenialRule")
            .field("pattern", &self.pattern.as_str())
            .field("reason", &self.reason)
            .finish()
    }
}

/// A signature indicating that a command mutates files or package state.
pub struct WriteSignature {
    pattern: Regex,
    label: &'static str,
}

impl WriteSignature {
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Short name of the mutation class (used in logs).
    pub fn label(&self) -> &'static str {
        self.label
    }

    pub(crate) fn is_match(&self, command: &str) -> bool {
        self.pattern.is_match(command)
    }
}

impl fmt::Debug for WriteSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteSignature")
            .field("pattern", &self.pattern.as_str())
            .field("label", &self.label)
            .finish()
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){pattern}")).expect("policy pattern is a valid regex")
}

fn deny(pattern: &str, reason: &'static str) -> DenialRule {
    DenialRule {
        pattern: compile(pattern),
        reason,
    }
}

fn write(pattern: &str, label: &'static str) -> WriteSignature {
    WriteSignature {
        pattern: compile(pattern),
        label,
    }
}

/// Shell token terminator: whitespace, a command separator, or end of input.
const END: &str = r"(\s|;|&|\||\)|$)";

/// Any run of arguments that stays within one simple command.
const ARGS: &str = r"([^;&|\s]+\s+)*";

/// Optional quote around a target word.
const Q: &str = r#"["']?"#;

/// Top-level directories whose removal bricks the device.
const SYSTEM_DIRS: &str =
    "System|bin|sbin|usr|etc|var|lib|private|private/etc|private/var|Applications|Library|dev|boot";

/// Denial rules in evaluation order. The first match is reported.
pub static DENIAL_RULES: LazyLock<Vec<DenialRule>> = LazyLock::new(|| {
    vec![
        deny(
            &format!(r"\brm\s+{ARGS}{Q}/+(\.|\*)?/?{Q}{END}"),
            "removing the root filesystem is not permitted",
        ),
        deny(
            &format!(r"\brm\s+{ARGS}{Q}(~|\$HOME|\$\{{HOME\}})/?\.?\*?{Q}{END}"),
            "removing the home directory is not permitted",
        ),
        deny(
            &format!(r"\brm\s+{ARGS}{Q}/+({SYSTEM_DIRS})/?\*?{Q}{END}"),
            "removing a system directory is not permitted",
        ),
        deny(
            r"\b(mkfs(\.\w+)?|newfs(_\w+)?|fdisk|diskutil\s+(erase\w*|partition\w*|zerodisk|secureerase))\b",
            "formatting or repartitioning disks is not permitted",
        ),
        deny(
            r"\bdd\b.*\bof=/dev/",
            "raw writes to block devices are not permitted",
        ),
        deny(
            r">\s*/dev/(r?disk\d|sd[a-z]|nvme|mmcblk|hd[a-z])",
            "redirecting output onto a block device is not permitted",
        ),
        deny(
            r":\s*\(\s*\)\s*\{\s*:\s*\|\s*:\s*&\s*\}\s*;\s*:",
            "fork bombs are not permitted",
        ),
        deny(
            &format!(r"\b(chmod|chown)\s+{ARGS}-\S*r\S*\s+{ARGS}{Q}/+(\.|\*)?{Q}{END}"),
            "recursive permission changes on the root filesystem are not permitted",
        ),
        deny(
            r"\b(reboot|shutdown|halt|poweroff)\b",
            "rebooting or powering off the device is not permitted",
        ),
        deny(
            r"\b(ldrestart|launchctl\s+reboot)\b",
            "restarting launchd or the userspace is not permitted",
        ),
        deny(
            &format!(r"\bkill(all)?\s+(-\S+\s+)*(-1|1|launchd|kernel_task){END}"),
            "signalling launchd or every process is not permitted",
        ),
        deny(
            r"\bnvram\s+(-\S+\s+)*-(c|d)\b",
            "clearing or deleting NVRAM variables is not permitted",
        ),
        deny(
            r"\b(curl|wget)\b[^|]*\|\s*(sudo\s+)?(ba|z|da|k)?sh\b",
            "piping downloaded content into a shell is not permitted",
        ),
        deny(
            &format!(r"\b(sudo|doas)\b|\bsu{END}"),
            "privilege escalation is not permitted",
        ),
    ]
});

/// Write-intent signatures. Deliberately over-inclusive.
pub static WRITE_SIGNATURES: LazyLock<Vec<WriteSignature>> = LazyLock::new(|| {
    vec![
        write(
            r"\b(mkdir|rmdir|rm|mv|cp|touch|ln|install|truncate|shred|unlink|mktemp|mkfifo)\b",
            "file-mutation",
        ),
        write(
            r"\b(chmod|chown|chgrp|chflags|setfacl)\b|\bxattr\s+(-\S+\s+)*-[wdc]\b",
            "metadata-change",
        ),
        write(r">{1,2}\s*[^&\s>]", "redirection"),
        write(r"\btee\b", "redirection"),
        write(r"\bdd\b", "block-copy"),
        write(r"\bsed\b.*\s(-[a-z]*i|--in-place)", "in-place-edit"),
        write(r"\bperl\s+(.*\s)?-\S*i", "in-place-edit"),
        write(
            r"\btar\s+(-\S+\s+)*-?[a-z]*[xcru]|\b(unzip|gunzip|bunzip2|unxz|7z|patch|rsync|scp|sftp)\b",
            "archive-or-sync",
        ),
        write(
            r"\btar\b.*\s--(extract|create|append|update|delete|get|concatenate)\b",
            "archive-or-sync",
        ),
        write(
            r"\b(gzip|bzip2|xz|zip|compress|uncompress|zstd|lz4|ditto)\b",
            "archive-or-sync",
        ),
        write(
            r"\b(apt|apt-get|aptitude|pip\d*(\.\d+)*|npm|yarn|pnpm|gem|cargo|brew|opkg|easy_install)\s+(\S+\s+)*?(install|uninstall|remove|purge|autoremove|(dist-|full-)?upgrade|update|add|reinstall)\b",
            "package-change",
        ),
        write(
            r"\bdpkg\s+(-\S+\s+)*(-i|-r|-p|--install|--remove|--purge|--unpack|--configure)\b",
            "package-change",
        ),
        write(r"\bwget\b", "download"),
        write(
            r"\bcurl\b.*\s(-[a-z]*o|--output|--remote-name)\b",
            "download",
        ),
        write(
            r"\b(launchctl|systemctl)\s+(load|unload|bootstrap|bootout|enable|disable|kickstart|start|stop|restart)\b",
            "service-change",
        ),
        write(
            r"\b(uicache|defaults\s+(write|delete|import)|plutil\s+-(replace|insert|remove|convert)|PlistBuddy)\b",
            "preference-change",
        ),
        write(r"\b(mount|umount)\b", "mount-change"),
        write(r"\bsqlite3?\b", "database"),
        write(
            r"\bgit\s+(clone|checkout|pull|reset|clean|commit|init|apply|stash|merge|rebase)\b",
            "vcs-change",
        ),
        write(
            r"\bfind\b.*\s-(delete|exec|execdir|ok|fprint\w*)\b",
            "find-action",
        ),
        write(
            r"\b(python\d*(\.\d+)*|perl|ruby|node|php|lua)\s+(-\S+\s+)*-(c|e)\b",
            "inline-script",
        ),
    ]
});
