//! HTML rendering of directory listings.

use html_escape::{encode_double_quoted_attribute, encode_text};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::fmt::Write;
use tarbro_core::{Kind, Listing};

/// Characters escaped in the path part of a link.
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`');

/// Characters escaped in the query part of a link.
const QUERY: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'>')
    .add(b'`');

/// Render the listing of `dir_path` as seen from `request_path`.
pub fn render_listing(request_path: &str, dir_path: &str, listing: &Listing) -> String {
    let title = if dir_path.is_empty() {
        request_path.to_string()
    } else {
        format!("{}?{}", request_path, dir_path)
    };

    let mut html = String::with_capacity(1024 + listing.len() * 160);
    let _ = write!(
        html,
        r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 3.2 Final//EN">
<html>
<head>
<title>Index of {title}</title>
</head>
<body>
<h1>Index of {title}</h1>
<pre><hr><img src="/icons/back.gif" alt="[PARENTDIR]"> <a href="{parent}">Parent Directory</a>

<table style="white-space:nowrap;">
<th style="text-align: left;">Name</th>
<th style="text-align: center;">Last modified</th>
<th style="text-align: left;">Size</th>
"#,
        title = encode_text(&title),
        parent = encode_double_quoted_attribute(&parent_href(request_path, dir_path)),
    );

    for row in &listing.rows {
        let name = encode_text(&row.name);
        let mtime = encode_text(&row.mtime);
        let href = child_href(request_path, dir_path, &row.name);
        let href = encode_double_quoted_attribute(&href);
        let _ = match row.kind {
            Kind::Directory => writeln!(
                html,
                r#"<tr><td><img src="/icons/folder.gif" alt="[DIR]"> <a href="{href}">{name}/</a></td> <td style="padding: 0 50px 0 50px">{mtime}</td> <td>-</td></tr>"#
            ),
            Kind::File => writeln!(
                html,
                r#"<tr><td><img src="/icons/generic.gif" alt="[FILE]"> <a href="{href}">{name}</a></td> <td style="padding: 0 50px 0 50px">{mtime}</td> <td>{size}</td></tr>"#,
                size = encode_text(row.size.as_deref().unwrap_or("-")),
            ),
            Kind::Symlink => writeln!(
                html,
                r#"<tr><td><img src="/icons/link.gif" alt="[SYMLINK]"> {name} -&gt; {target}</td> <td style="padding: 0 50px 0 50px">{mtime}</td> <td>-</td></tr>"#,
                target = encode_text(row.link_target.as_deref().unwrap_or_default()),
            ),
        };
    }

    html.push_str("</table>\n<hr></pre>\n</body></html>\n");
    html
}

/// Link to the parent of `dir_path`; for the archive root, the directory
/// holding the archive.
pub fn parent_href(request_path: &str, dir_path: &str) -> String {
    let base = encode_path(request_path);
    if dir_path.is_empty() {
        return match request_path.rsplit_once('/') {
            Some((parent, _)) if !parent.is_empty() => encode_path(parent),
            _ => "/".to_string(),
        };
    }
    match dir_path.rsplit_once('/') {
        Some((parent, _)) => format!("{}?{}", base, encode_query(parent)),
        None => base,
    }
}

/// Link to the child `name` of `dir_path`.
pub fn child_href(request_path: &str, dir_path: &str, name: &str) -> String {
    let base = encode_path(request_path);
    if dir_path.is_empty() {
        format!("{}?{}", base, encode_query(name))
    } else {
        format!("{}?{}/{}", base, encode_query(dir_path), encode_query(name))
    }
}

fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, PATH).to_string()
}

fn encode_query(query: &str) -> String {
    utf8_percent_encode(query, QUERY).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tarbro_core::ListingRow;

    fn row(name: &str, kind: Kind) -> ListingRow {
        ListingRow {
            name: name.to_string(),
            kind,
            mtime: "2023-11-14 22:13".to_string(),
            size: (kind == Kind::File).then(|| "120 bytes".to_string()),
            link_target: (kind == Kind::Symlink).then(|| "docs/img".to_string()),
        }
    }

    #[test]
    fn test_parent_links() {
        assert_eq!(parent_href("/files/a.tar", ""), "/files");
        assert_eq!(parent_href("/a.tar", ""), "/");
        assert_eq!(parent_href("/a.tar", "docs"), "/a.tar");
        assert_eq!(parent_href("/a.tar", "docs/img"), "/a.tar?docs");
    }

    #[test]
    fn test_child_links() {
        assert_eq!(child_href("/a.tar", "", "docs"), "/a.tar?docs");
        assert_eq!(child_href("/a.tar", "docs", "img"), "/a.tar?docs/img");
        assert_eq!(child_href("/my files.tar", "", "a b&c"), "/my%20files.tar?a%20b%26c");
    }

    #[test]
    fn test_render_rows_in_listing_order() {
        let listing = Listing {
            rows: vec![
                row("img", Kind::Directory),
                row("latest", Kind::Symlink),
                row("readme.txt", Kind::File),
            ],
        };
        let html = render_listing("/a.tar", "docs", &listing);

        assert!(html.contains("<title>Index of /a.tar?docs</title>"));
        assert!(html.contains(r#"<a href="/a.tar">Parent Directory</a>"#));
        assert!(html.contains(r#"<a href="/a.tar?docs/img">img/</a>"#));
        assert!(html.contains("latest -&gt; docs/img"));
        assert!(html.contains("<td>120 bytes</td>"));

        let img = html.find("img/</a>").unwrap();
        let readme = html.find("readme.txt</a>").unwrap();
        assert!(img < readme);
    }

    #[test]
    fn test_names_are_escaped() {
        let listing = Listing {
            rows: vec![row("<script>", Kind::File), row("fish & chips", Kind::Directory)],
        };
        let html = render_listing("/a.tar", "", &listing);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains(r#"<a href="/a.tar?fish%20%26%20chips">fish &amp; chips/</a>"#));
    }
}
