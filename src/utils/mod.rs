pub mod password;
pub mod url_validator;

/// 从 User-Agent 推导设备类别
///
/// 刻意使用简单子串匹配：先 mobile 后 tablet，其余归 desktop。
/// 客户端可伪造 UA，这里只做粗粒度分桶。
pub fn device_class(user_agent: &str) -> &'static str {
    let ua = user_agent.to_ascii_lowercase();
    if ua.contains("mobile") {
        "mobile"
    } else if ua.contains("tablet") {
        "tablet"
    } else {
        "desktop"
    }
}

/// 从名称派生 URL slug：小写、空白转 '-'、去掉其余字符
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = false;
    for c in name.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            last_dash = false;
        } else if (c.is_whitespace() || c == '-') && !last_dash && !slug.is_empty() {
            slug.push('-');
            last_dash = true;
        }
    }
    if slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// 生成指定字节数的随机 token（十六进制编码）
pub fn generate_secure_token(bytes: usize) -> String {
    use rand::RngExt;
    let mut buf = vec![0u8; bytes];
    rand::rng().fill(&mut buf[..]);
    buf.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_class_mobile() {
        assert_eq!(
            device_class("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0) Mobile/15E148 Safari"),
            "mobile"
        );
    }

    #[test]
    fn test_device_class_tablet() {
        assert_eq!(
            device_class("Mozilla/5.0 (Linux; Android 13; SM-X200 Tablet) Safari"),
            "tablet"
        );
    }

    #[test]
    fn test_device_class_mobile_wins_over_tablet() {
        // 同时包含两个关键字时 mobile 优先
        assert_eq!(device_class("SomeBrowser Tablet Mobile"), "mobile");
    }

    #[test]
    fn test_device_class_desktop_fallback() {
        assert_eq!(
            device_class("Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/120.0"),
            "desktop"
        );
        assert_eq!(device_class(""), "desktop");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Bismillah Kebab House"), "bismillah-kebab-house");
        assert_eq!(slugify("  Al-Noor   Grill  "), "al-noor-grill");
        assert_eq!(slugify("Café 99!"), "caf-99");
    }

    #[test]
    fn test_generate_secure_token_length() {
        let token = generate_secure_token(32);
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
