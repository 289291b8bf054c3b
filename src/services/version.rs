//! # 版本号比较
//!
//! 三段式版本号（`MAJOR.MINOR.PATCH`，可带 `v` 前缀和 `-prerelease` 后缀）的解析与全序比较，
//! 以及按闭区间从 registry 版本列表中筛选出待处理版本。

use std::cmp::Ordering;
use std::fmt;

/// 解析后的版本号
///
/// 排序规则：先按数字三元组比较；三元组相同时正式版高于任何预发布版，
/// 预发布标签之间按字典序比较。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: Option<String>,
}

impl Version {
    /// 解析版本字符串，缺失的 minor / patch 视为 0，非数字部分返回 `None`
    pub fn parse(raw: &str) -> Option<Version> {
        let raw = raw.trim();
        let raw = raw.strip_prefix('v').unwrap_or(raw);
        // 构建元数据（+build）不参与排序
        let raw = raw.split('+').next()?;
        let (core, pre) = match raw.split_once('-') {
            Some((core, pre)) if !pre.is_empty() => (core, Some(pre.to_string())),
            Some(_) => return None,
            None => (raw, None),
        };

        let mut parts = core.splitn(3, '.');
        let major = parts.next()?.parse().ok()?;
        let minor = match parts.next() {
            Some(p) => p.parse().ok()?,
            None => 0,
        };
        let patch = match parts.next() {
            Some(p) => p.parse().ok()?,
            None => 0,
        };

        Some(Version {
            major,
            minor,
            patch,
            pre,
        })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.pre, &other.pre) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre {
            write!(f, "-{}", pre)?;
        }
        Ok(())
    }
}

/// 比较两个版本字符串
///
/// 无法解析的版本排在所有可解析版本之前，彼此之间按原始字符串比较，保证全序。
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (Version::parse(a), Version::parse(b)) {
        (Some(va), Some(vb)) => va.cmp(&vb).then_with(|| a.cmp(b)),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// 从版本列表中筛选闭区间 `[from, to]` 内的版本
///
/// `to` 为 `None` 表示无上界。结果升序、去重；无法解析的版本被丢弃。
///
/// # 参数
/// - `versions` - registry 返回的全部版本字符串
/// - `from` - 下界（含）
/// - `to` - 上界（含），可选
pub fn select_range(versions: &[String], from: &Version, to: Option<&Version>) -> Vec<String> {
    let mut selected: Vec<(Version, &String)> = versions
        .iter()
        .filter_map(|raw| Version::parse(raw).map(|v| (v, raw)))
        .filter(|(v, _)| v >= from && to.is_none_or(|upper| v <= upper))
        .collect();

    selected.sort_by(|a, b| a.0.cmp(&b.0));
    selected.dedup_by(|a, b| a.0 == b.0);
    selected.into_iter().map(|(_, raw)| raw.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(raw: &str) -> Version {
        Version::parse(raw).unwrap()
    }

    #[test]
    fn test_parse_variants() {
        assert_eq!(
            v("1.0.44"),
            Version {
                major: 1,
                minor: 0,
                patch: 44,
                pre: None
            }
        );
        assert_eq!(v("v2.1"), v("2.1.0"));
        assert_eq!(v("0.2.9-beta.1").pre.as_deref(), Some("beta.1"));
        assert!(Version::parse("latest").is_none());
        assert!(Version::parse("1.x.0").is_none());
        assert!(Version::parse("1.0.0-").is_none());
    }

    #[test]
    fn test_numeric_not_lexical_ordering() {
        assert!(v("1.0.10") > v("1.0.9"));
        assert!(v("1.10.0") > v("1.9.99"));
        assert!(v("2.0.0") > v("1.99.99"));
    }

    #[test]
    fn test_release_outranks_prerelease() {
        assert!(v("1.0.0") > v("1.0.0-rc.1"));
        assert!(v("1.0.0-rc.2") > v("1.0.0-rc.1"));
        assert!(v("1.0.1-alpha") > v("1.0.0"));
    }

    #[test]
    fn test_compare_versions_total() {
        assert_eq!(compare_versions("1.0.2", "1.0.10"), Ordering::Less);
        assert_eq!(compare_versions("1.0.2", "1.0.2"), Ordering::Equal);
        assert_eq!(compare_versions("nightly", "0.0.1"), Ordering::Less);
        assert_eq!(compare_versions("b", "a"), Ordering::Greater);
    }

    #[test]
    fn test_select_range_inclusive_sorted() {
        let versions: Vec<String> = ["1.0.10", "0.2.9", "1.0.2", "1.0.9", "garbage", "1.1.0"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let picked = select_range(&versions, &v("1.0.2"), Some(&v("1.0.10")));
        assert_eq!(picked, vec!["1.0.2", "1.0.9", "1.0.10"]);

        let open = select_range(&versions, &v("1.0.9"), None);
        assert_eq!(open, vec!["1.0.9", "1.0.10", "1.1.0"]);
    }

    #[test]
    fn test_display_normalizes() {
        assert_eq!(v("v1.2").to_string(), "1.2.0");
        assert_eq!(v("1.0.0-rc.1+build.5").to_string(), "1.0.0-rc.1");
    }

    #[test]
    fn test_select_range_empty_when_inverted() {
        let versions = vec!["1.0.0".to_string(), "1.0.1".to_string()];
        assert!(select_range(&versions, &v("1.0.1"), Some(&v("1.0.0"))).is_empty());
    }
}
