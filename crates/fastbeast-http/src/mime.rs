//! Extension → content-type lookup. Entries are complete header lines so
//! the serializer can gather them as single static slices.

/// Content-type for unknown or missing extensions, and for error bodies.
pub const DEFAULT_CONTENT_TYPE: &str = "Content-Type: application/text\r\n";

// Order-significant: first case-insensitive match wins.
const TABLE: &[(&str, &str)] = &[
    (".htm", "Content-Type: text/html\r\n"),
    (".html", "Content-Type: text/html\r\n"),
    (".php", "Content-Type: text/html\r\n"),
    (".css", "Content-Type: text/css\r\n"),
    (".txt", "Content-Type: text/plain\r\n"),
    (".js", "Content-Type: application/javascript\r\n"),
    (".json", "Content-Type: application/json\r\n"),
    (".xml", "Content-Type: application/xml\r\n"),
    (".swf", "Content-Type: application/x-shockwave-flash\r\n"),
    (".flv", "Content-Type: video/x-flv\r\n"),
    (".png", "Content-Type: image/png\r\n"),
    (".jpe", "Content-Type: image/jpeg\r\n"),
    (".jpeg", "Content-Type: image/jpeg\r\n"),
    (".jpg", "Content-Type: image/jpeg\r\n"),
    (".gif", "Content-Type: image/gif\r\n"),
    (".bmp", "Content-Type: image/bmp\r\n"),
    (".ico", "Content-Type: image/vnd.microsoft.icon\r\n"),
    (".tiff", "Content-Type: image/tiff\r\n"),
    (".tif", "Content-Type: image/tiff\r\n"),
    (".svg", "Content-Type: image/svg+xml\r\n"),
    (".svgz", "Content-Type: image/svg+xml\r\n"),
];

/// Looks up the content-type line for a request target. The extension is
/// the substring from the final `.` to the end of the target.
pub fn content_type_line(target: &str) -> &'static str {
    let ext = match target.rfind('.') {
        Some(pos) => &target[pos..],
        None => return DEFAULT_CONTENT_TYPE,
    };
    for (table_ext, line) in TABLE {
        if table_ext.eq_ignore_ascii_case(ext) {
            return line;
        }
    }
    DEFAULT_CONTENT_TYPE
}
