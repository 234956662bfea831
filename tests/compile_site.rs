//! End-to-end compile of a small site: generic, event, tutorial and post
//! pages, both feeds, and byte-for-byte reproducibility.

use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use treepress::compile::{self, CompileError, Options};
use treepress::page::PageError;
use treepress::resolve::ResolveError;
use walkdir::WalkDir;

const LAYOUT: &str = r#"<!doctype html>
<html>
<head>
<meta name="generated" content="{{ timestamp }}" />
<title>{% if title %}{{ title }}{% endif %}</title>
</head>
<body>
{% block summary %}{% endblock summary %}
{% block content %}{% endblock content %}
<nav>{% if prev %}<a rel="prev" href="{{ prev }}">prev</a>{% endif %}{% if next %}<a rel="next" href="{{ next }}">next</a>{% endif %}{% if uplink %}<a rel="up" href="{{ uplink }}">up</a>{% endif %}</nav>
<footer>{{ today }} {{ root_path }}</footer>
</body>
</html>
"#;

const TEMPLATES: &[(&str, &str)] = &[
    ("_page.html", LAYOUT),
    ("_generic.html", "<!-- pagekind: generic -->\n{% extends \"_page.html\" %}\n"),
    (
        "_bootcamp.html",
        "<!-- pagekind: event -->\n{% extends \"_page.html\" %}\n\
         {% block summary %}<p class=\"when\">{{ venue }}: {{ date }}</p>{% endblock summary %}\n",
    ),
    ("_lesson.html", "<!-- pagekind: tutorial-index -->\n{% extends \"_page.html\" %}\n"),
    ("_topic.html", "<!-- pagekind: tutorial-topic -->\n{% extends \"_page.html\" %}\n"),
    (
        "_blog.html",
        "<!-- pagekind: post-index -->\n{% extends \"_page.html\" %}\n\
         {% block summary %}{% for year in years %}<h2>{{ year }}</h2>{% for month in months %}\
         {% if (year ~ '-' ~ month) in posts %}<h3>{{ month_name(month) }}</h3>\
         {% for post in posts[year ~ '-' ~ month] %}<a href=\"{{ post.index_link }}\">{{ post.title }}</a>{% endfor %}\
         {% endif %}{% endfor %}{% endfor %}{% endblock summary %}\n",
    ),
    // Two-step chain: _post.html has no marker of its own.
    ("_post_base.html", "<!-- pagekind: post -->\n{% extends \"_page.html\" %}\n"),
    (
        "_post.html",
        "{% extends \"_post_base.html\" %}\n\
         {% block summary %}<p class=\"byline\">{{ author_id }}, {{ post_date }}</p>{% endblock summary %}\n",
    ),
];

fn page(base: &str, markers: &[(&str, &str)], content: &str) -> String {
    let markers: Vec<String> = markers
        .iter()
        .map(|(name, value)| format!(r#"<meta name="{name}" content="{value}" />"#))
        .collect();
    format!(
        "{{% extends \"{base}\" %}}\n{{% block file_metadata %}}\n{}\n{{% endblock file_metadata %}}\n{{% block content %}}\n{content}\n{{% endblock content %}}\n",
        markers.join("\n")
    )
}

fn post(id: &str, date: &str, title: &str) -> String {
    page(
        "_post.html",
        &[
            ("post_id", id),
            ("author_id", "wilson.g"),
            ("title", title),
            ("post_date", date),
            ("category", "news"),
            ("category", "tooling"),
        ],
        &format!("<p>{title}: see <a href=\"{{{{ root_path }}}}/index.html\">home</a>.</p>"),
    )
}

fn write(path: &Path, text: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

struct Site {
    tmp: TempDir,
}

impl Site {
    fn new() -> Self {
        let site = Site {
            tmp: TempDir::new().unwrap(),
        };
        for (name, text) in TEMPLATES {
            write(&site.templates().join(name), text);
        }

        site.content(
            "index.html",
            &page(
                "_generic.html",
                &[
                    ("title", "Home"),
                    ("subfile", "bootcamps/index.html"),
                    ("subfile", "lessons/index.html"),
                    ("subfile", "blog/index.html"),
                ],
                "<p>Welcome</p>",
            ),
        );

        site.content(
            "bootcamps/index.html",
            &page(
                "_generic.html",
                &[("title", "Boot Camps"), ("subglob", "20*.html")],
                "<p>Upcoming</p>",
            ),
        );
        site.content(
            "bootcamps/2013-07-oslo.html",
            &page(
                "_bootcamp.html",
                &[
                    ("title", "Oslo"),
                    ("venue", "University of Oslo"),
                    ("startdate", "2013-06-30"),
                    ("enddate", "2013-07-01"),
                ],
                "<p>Oslo</p>",
            ),
        );
        site.content(
            "bootcamps/2013-06-paris.html",
            &page(
                "_bootcamp.html",
                &[
                    ("title", "Paris"),
                    ("venue", "Inria, Paris"),
                    ("latlng", "48.8566,2.3522"),
                    ("startdate", "2013-06-01"),
                    ("enddate", "2013-06-02"),
                ],
                "<p>Paris</p>",
            ),
        );

        site.content(
            "lessons/index.html",
            &page(
                "_generic.html",
                &[("title", "Lessons"), ("subfile", "python/index.html")],
                "<p>Lessons</p>",
            ),
        );
        site.content(
            "lessons/python/index.html",
            &page(
                "_lesson.html",
                &[("title", "Python"), ("subfile", "func.html"), ("subfile", "lists.html")],
                "<ul class=\"keypoints\">\n<li>Name things.</li>\n</ul>",
            ),
        );
        site.content(
            "lessons/python/func.html",
            &page("_topic.html", &[("title", "Functions")], "<p>def</p>"),
        );
        site.content(
            "lessons/python/lists.html",
            &page("_topic.html", &[("title", "Lists")], "<p>[]</p>"),
        );

        site.content(
            "blog/index.html",
            &page("_blog.html", &[("title", "Blog"), ("subglob", "*/*/*.html")], ""),
        );
        // Lexical order puts id 10 first; id order must win.
        site.content("blog/2013/05/a-ten.html", &post("10", "2013-05-20", "Ten"));
        site.content("blog/2013/06/z-seven.html", &post("7", "2013-06-01", "Seven"));
        site.content("blog/2013/06/m-twelve.html", &post("12", "2013-06-03", "Twelve"));

        write(
            &site.tmp.path().join("translations.json"),
            r#"{"author_id": {"wilson.g": "Greg Wilson"}}"#,
        );
        write(
            &site.tmp.path().join("site.toml"),
            "[feed]\nhistory_length = 2\n\n[site]\ntitle = \"Test Carpentry\"\n",
        );
        site
    }

    fn root(&self) -> PathBuf {
        self.tmp.path().join("site")
    }

    fn templates(&self) -> PathBuf {
        self.tmp.path().join("templates")
    }

    fn content(&self, path: &str, text: &str) {
        write(&self.root().join(path), text);
    }

    fn options(&self, out: &str) -> Options {
        let out = self.tmp.path().join(out);
        Options {
            root: self.root(),
            files: vec![PathBuf::from("index.html")],
            item_feed: Some(out.join("feed.xml")),
            calendar: Some(out.join("bootcamps/bootcamps.ics")),
            output_dir: out,
            search_path: vec![self.templates()],
            site: "http://example.org/".into(),
            today: Some("2013-06-15".into()),
            translations: Some(self.tmp.path().join("translations.json")),
            config: Some(self.tmp.path().join("site.toml")),
        }
    }

    fn read(&self, out: &str, path: &str) -> String {
        fs::read_to_string(self.tmp.path().join(out).join(path)).unwrap()
    }
}

#[test]
fn renders_every_page() {
    let site = Site::new();
    let report = compile::compile(&site.options("out")).unwrap();

    assert_eq!(report.written, 12);
    assert_eq!(report.inventory.registries.events.len(), 2);
    assert_eq!(report.inventory.registries.posts.len(), 3);
    for path in [
        "index.html",
        "bootcamps/index.html",
        "bootcamps/2013-06-paris.html",
        "bootcamps/2013-07-oslo.html",
        "lessons/index.html",
        "lessons/python/index.html",
        "lessons/python/func.html",
        "lessons/python/lists.html",
        "blog/index.html",
        "blog/2013/05/a-ten.html",
        "blog/2013/06/m-twelve.html",
        "blog/2013/06/z-seven.html",
    ] {
        assert!(site.tmp.path().join("out").join(path).is_file(), "{path} not rendered");
    }
}

#[test]
fn events_sorted_and_linked() {
    let site = Site::new();
    compile::compile(&site.options("out")).unwrap();

    let paris = site.read("out", "bootcamps/2013-06-paris.html");
    assert!(paris.contains(r#"<p class="when">Inria, Paris: Jun 1-2, 2013</p>"#));
    assert!(paris.contains(r#"<a rel="next" href="2013-07-oslo.html">next</a>"#));
    assert!(paris.contains(r#"<a rel="up" href="index.html">up</a>"#));

    let oslo = site.read("out", "bootcamps/2013-07-oslo.html");
    assert!(oslo.contains("University of Oslo: Jun 30 - Jul 1, 2013"));
    assert!(oslo.contains(r#"<a rel="prev" href="2013-06-paris.html">prev</a>"#));
}

#[test]
fn tutorial_pages_linked() {
    let site = Site::new();
    compile::compile(&site.options("out")).unwrap();

    let func = site.read("out", "lessons/python/func.html");
    assert!(func.contains(r#"<a rel="next" href="lists.html">next</a>"#));
    assert!(func.contains("<footer>2013-06-15 ../..</footer>"));
}

#[test]
fn posts_ordered_by_id() {
    let site = Site::new();
    let report = compile::compile(&site.options("out")).unwrap();

    let blog = &report.inventory.trees[0].children[2];
    let titles: Vec<&str> = blog.children.iter().map(|p| p.title().unwrap()).collect();
    assert_eq!(titles, ["Seven", "Ten", "Twelve"]);

    let index = site.read("out", "blog/index.html");
    let seven = index.find(r#"<a href="2013/06/z-seven.html">Seven</a>"#).unwrap();
    let twelve = index.find(r#"<a href="2013/06/m-twelve.html">Twelve</a>"#).unwrap();
    let ten = index.find(r#"<a href="2013/05/a-ten.html">Ten</a>"#).unwrap();
    assert!(ten < seven && seven < twelve);
    assert!(index.contains("<h3>May</h3>"));

    let seven_page = site.read("out", "blog/2013/06/z-seven.html");
    assert!(seven_page.contains(r#"<p class="byline">Greg Wilson, 2013-06-01</p>"#));
    assert!(seven_page.contains(r#"<a rel="next" href="../../2013/05/a-ten.html">next</a>"#));
    assert!(seven_page.contains(r#"<a rel="up" href="../../index.html">up</a>"#));
}

#[test]
fn item_feed_window() {
    let site = Site::new();
    compile::compile(&site.options("out")).unwrap();

    let feed = site.read("out", "feed.xml");
    // Registry order is discovery order [10, 12, 7]; the last two, reversed.
    assert_eq!(feed.matches("<item>").count(), 2);
    let seven = feed.find("<title>Seven</title>").unwrap();
    let twelve = feed.find("<title>Twelve</title>").unwrap();
    assert!(seven < twelve);
    assert!(!feed.contains("<title>Ten</title>"));
    assert!(feed.contains("<title>Test Carpentry</title>"));
    assert!(feed.contains("http://example.org/index.html"));
    assert!(feed.contains("<author>Greg Wilson</author>"));
    assert!(feed.contains("<link>http://example.org/blog/2013/06/m-twelve.html</link>"));
}

#[test]
fn calendar_feed() {
    let site = Site::new();
    compile::compile(&site.options("out")).unwrap();

    let ics = site.read("out", "bootcamps/bootcamps.ics");
    assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
    assert!(ics.contains("UID:bootcamps/2013-06-paris.html@example.org\r\n"));
    assert!(ics.contains("DTEND;VALUE=DATE:20130603\r\n"));
    assert!(ics.contains("DTEND;VALUE=DATE:20130702\r\n"));
    assert!(ics.contains("LOCATION:Inria\\, Paris\r\n"));
    assert!(ics.contains("GEO:48.8566;2.3522\r\n"));
}

/// Output of two runs, with generation timestamps blanked out.
fn tree_contents(root: &Path) -> Vec<(PathBuf, String)> {
    let timestamp = Regex::new(
        r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z|DTSTAMP:\d{8}T\d{6}Z|<lastBuildDate>[^<]*</lastBuildDate>",
    )
    .unwrap();
    let mut files: Vec<(PathBuf, String)> = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let text = fs::read_to_string(entry.path()).unwrap();
            let stable = timestamp.replace_all(&text, "<timestamp>").into_owned();
            (entry.path().strip_prefix(root).unwrap().to_path_buf(), stable)
        })
        .collect();
    files.sort();
    files
}

#[test]
fn repeated_runs_are_identical() {
    let site = Site::new();
    compile::compile(&site.options("first")).unwrap();
    compile::compile(&site.options("second")).unwrap();

    let first = tree_contents(&site.tmp.path().join("first"));
    let second = tree_contents(&site.tmp.path().join("second"));
    assert_eq!(first.len(), 14);
    assert_eq!(first, second);
}

#[test]
fn orphan_chain_names_originating_file() {
    let site = Site::new();
    write(&site.templates().join("_bare.html"), "<html></html>");
    site.content(
        "orphan.html",
        "{% extends \"_bare.html\" %}\n<meta name=\"title\" content=\"Orphan\" />",
    );

    let mut options = site.options("out");
    options.files = vec![PathBuf::from("orphan.html")];
    match compile::check(&options) {
        Err(CompileError::Page(PageError::Resolve(ResolveError::NoKind { origin, .. }))) => {
            assert_eq!(origin, site.root().join("orphan.html"));
        }
        other => panic!("expected NoKind, got {other:?}"),
    }
    assert!(!site.tmp.path().join("out").exists());
}
