//! # Phân giải IP client
//!
//! Ứng dụng chạy sau một hoặc nhiều reverse proxy / CDN, vì vậy IP thật của
//! client phải được suy ra từ các header chuỗi proxy.
//!
//! ## Thứ tự ưu tiên (khớp đầu tiên thắng)
//!
//! 1. `X-Forwarded-For` — lấy phần tử đầu tiên (client gốc, theo quy ước
//!    chuỗi proxy trái-sang-phải)
//! 2. `CF-Connecting-IP` (header riêng của CDN)
//! 3. `X-Real-IP`
//! 4. `X-Client-IP`
//! 5. `Forwarded` (RFC 7239) — tham số `for=`, bỏ dấu nháy/ngoặc vuông và
//!    cổng đuôi
//! 6. Hằng số loopback nếu không khớp gì — chính sách "không bao giờ ném
//!    lỗi": các tính năng phụ thuộc IP phải chấp nhận giá trị không xác định
//!    thay vì làm hỏng request.

use http::HeaderMap;

/// Giá trị trả về khi không có header nào chứa IP dùng được
pub const FALLBACK_IP: &str = "127.0.0.1";

/// Suy ra IP client tốt nhất có thể từ các header chuỗi proxy
///
/// Không bao giờ thất bại: nếu mọi header vắng mặt hoặc rỗng thì trả về
/// [`FALLBACK_IP`]. Giá trị trả về đã được chuẩn hoá qua [`normalize_ip`].
pub fn extract_client_ip(headers: &HeaderMap) -> String {
    if let Some(value) = header_str(headers, "x-forwarded-for") {
        // Phần tử đầu tiên trong danh sách phân tách bằng dấu phẩy là client gốc
        if let Some(first) = value.split(',').next() {
            let ip = normalize_ip(first);
            if !ip.is_empty() {
                return ip;
            }
        }
    }

    for name in ["cf-connecting-ip", "x-real-ip", "x-client-ip"] {
        if let Some(value) = header_str(headers, name) {
            let ip = normalize_ip(value);
            if !ip.is_empty() {
                return ip;
            }
        }
    }

    if let Some(value) = header_str(headers, "forwarded") {
        if let Some(ip) = parse_forwarded(value) {
            return ip;
        }
    }

    FALLBACK_IP.to_string()
}

/// Lấy user agent từ header, rỗng nếu vắng mặt hoặc không phải UTF-8
pub fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    header_str(headers, "user-agent").map(|s| s.trim().to_string())
}

/// Chuẩn hoá một chuỗi IP thô lấy từ header
///
/// - Cắt khoảng trắng và dấu nháy kép bao quanh
/// - Bỏ ngoặc vuông của IPv6 literal (`[2001:db8::1]:8080` → `2001:db8::1`)
/// - Chỉ bỏ hậu tố `:port` khi phần sau dấu hai chấm thuần số **và** chuỗi
///   chỉ chứa đúng một dấu hai chấm — tránh cắt nhầm địa chỉ IPv6 trần vốn
///   chứa nhiều dấu hai chấm
pub fn normalize_ip(raw: &str) -> String {
    let value = raw.trim().trim_matches('"').trim();

    // IPv6 literal trong ngoặc vuông, có thể kèm cổng phía sau
    if let Some(rest) = value.strip_prefix('[') {
        if let Some(end) = rest.find(']') {
            return rest[..end].to_string();
        }
    }

    let colon_count = value.matches(':').count();
    if colon_count == 1 {
        if let Some((host, port)) = value.rsplit_once(':') {
            if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) {
                return host.to_string();
            }
        }
    }

    value.to_string()
}

/// Kiểm tra IP có thuộc dải riêng tư / nội bộ hay không
///
/// Dùng để quyết định trọng số của tín hiệu "IP mới" trong heuristic cảnh
/// báo: IP riêng tư bị loại vì nhiều người dùng chung dải NAT.
///
/// Dải được coi là riêng tư:
/// - IPv4: loopback, RFC1918 (10/8, 172.16/12, 192.168/16), link-local
///   (169.254/16), unspecified
/// - IPv6: loopback (::1), link-local (fe80::/10), unique-local (fc00::/7),
///   unspecified
///
/// Chuỗi không phân tích được coi là riêng tư — giá trị lạ không được phép
/// kích hoạt heuristic cảnh báo.
pub fn is_private_ip(ip: &str) -> bool {
    let Ok(addr) = ip.parse::<std::net::IpAddr>() else {
        return true;
    };

    match addr {
        std::net::IpAddr::V4(v4) => {
            v4.is_loopback() || v4.is_private() || v4.is_link_local() || v4.is_unspecified()
        }
        std::net::IpAddr::V6(v6) => {
            let seg0 = v6.segments()[0];
            v6.is_loopback()
                || v6.is_unspecified()
                || (seg0 & 0xffc0) == 0xfe80 // link-local fe80::/10
                || (seg0 & 0xfe00) == 0xfc00 // unique-local fc00::/7
        }
    }
}

/// Trích IP từ header `Forwarded` (RFC 7239)
///
/// Chỉ xét phần tử đầu tiên (hop gần client nhất trong danh sách).
/// Trả về `None` nếu không có tham số `for=` hợp lệ.
fn parse_forwarded(value: &str) -> Option<String> {
    let first_element = value.split(',').next()?;

    for pair in first_element.split(';') {
        let Some((key, val)) = pair.trim().split_once('=') else {
            continue;
        };
        if key.trim().eq_ignore_ascii_case("for") {
            let ip = normalize_ip(val);
            if !ip.is_empty() {
                return Some(ip);
            }
        }
    }

    None
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let value = headers.get(name)?.to_str().ok()?;
    let value = value.trim();
    if value.is_empty() { None } else { Some(value) }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                http::HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    // Thứ tự ưu tiên

    #[test]
    fn test_x_forwarded_for_lấy_phần_tử_đầu_tiên() {
        let h = headers(&[("x-forwarded-for", "203.0.113.5, 10.0.0.1")]);
        assert_eq!(extract_client_ip(&h), "203.0.113.5");
    }

    #[test]
    fn test_x_forwarded_for_thắng_các_header_khác() {
        let h = headers(&[
            ("x-forwarded-for", "203.0.113.5"),
            ("cf-connecting-ip", "198.51.100.7"),
            ("x-real-ip", "192.0.2.9"),
        ]);
        assert_eq!(extract_client_ip(&h), "203.0.113.5");
    }

    #[test]
    fn test_cf_connecting_ip_thắng_x_real_ip() {
        let h = headers(&[
            ("cf-connecting-ip", "198.51.100.7"),
            ("x-real-ip", "192.0.2.9"),
        ]);
        assert_eq!(extract_client_ip(&h), "198.51.100.7");
    }

    #[test]
    fn test_x_real_ip_thắng_x_client_ip() {
        let h = headers(&[("x-real-ip", "192.0.2.9"), ("x-client-ip", "192.0.2.10")]);
        assert_eq!(extract_client_ip(&h), "192.0.2.9");
    }

    #[test]
    fn test_forwarded_rfc7239_với_ipv6_có_ngoặc_và_cổng() {
        let h = headers(&[("forwarded", r#"for="[2001:db8::1]:8080""#)]);
        assert_eq!(extract_client_ip(&h), "2001:db8::1");
    }

    #[test]
    fn test_forwarded_rfc7239_nhiều_tham_số() {
        let h = headers(&[("forwarded", "proto=https;for=203.0.113.5;by=198.51.100.1")]);
        assert_eq!(extract_client_ip(&h), "203.0.113.5");
    }

    #[test]
    fn test_không_có_header_nào_trả_về_loopback() {
        let h = HeaderMap::new();
        assert_eq!(extract_client_ip(&h), FALLBACK_IP);
    }

    #[test]
    fn test_header_rỗng_rơi_xuống_fallback() {
        let h = headers(&[("x-forwarded-for", "  ")]);
        assert_eq!(extract_client_ip(&h), FALLBACK_IP);
    }

    // Chuẩn hoá

    #[rstest]
    #[case("203.0.113.5:443", "203.0.113.5")]
    #[case(" 203.0.113.5 ", "203.0.113.5")]
    #[case("[2001:db8::1]", "2001:db8::1")]
    #[case("[2001:db8::1]:8080", "2001:db8::1")]
    #[case("2001:db8::1", "2001:db8::1")]
    #[case("\"203.0.113.5\"", "203.0.113.5")]
    fn test_chuẩn_hoá_ip(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_ip(input), expected);
    }

    #[test]
    fn test_không_cắt_ipv6_trần_nhiều_dấu_hai_chấm() {
        // "fe80::1" có hai dấu hai chấm, không được hiểu nhầm thành host:port
        assert_eq!(normalize_ip("fe80::1"), "fe80::1");
    }

    // Phân loại IP riêng tư

    #[rstest]
    #[case("127.0.0.1")]
    #[case("10.1.2.3")]
    #[case("172.16.0.1")]
    #[case("192.168.1.100")]
    #[case("169.254.0.5")]
    #[case("::1")]
    #[case("fe80::1")]
    #[case("fd12:3456::1")]
    fn test_ip_riêng_tư(#[case] ip: &str) {
        assert!(is_private_ip(ip));
    }

    #[rstest]
    #[case("203.0.113.5")]
    #[case("8.8.8.8")]
    #[case("172.32.0.1")]
    #[case("2001:db8::1")]
    fn test_ip_công_cộng(#[case] ip: &str) {
        assert!(!is_private_ip(ip));
    }

    #[test]
    fn test_chuỗi_không_phân_tích_được_coi_là_riêng_tư() {
        assert!(is_private_ip("not-an-ip"));
        assert!(is_private_ip(""));
    }
}
