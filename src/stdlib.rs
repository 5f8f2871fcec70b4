//! Version-tagged manifest of CPython standard-library modules
//!
//! The manifest lets the classifier recognise standard-library names without
//! importing anything, and without a runtime being present on disk. Entries
//! carry the minor version (of Python 3) that added them and, where it
//! happened, the one that removed them.

use crate::environment::PythonVersion;

/// Oldest runtime the manifest describes.
pub const OLDEST_KNOWN_MINOR: u32 = 8;

/// Newest runtime the manifest describes; used when no version is known.
pub const NEWEST_KNOWN_MINOR: u32 = 14;

/// A top-level standard-library module and the releases that carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StdlibModule {
    pub name: &'static str,
    /// First 3.x minor release shipping the module.
    pub added: u32,
    /// First 3.x minor release no longer shipping it.
    pub removed: Option<u32>,
}

impl StdlibModule {
    const fn always(name: &'static str) -> Self {
        Self {
            name,
            added: OLDEST_KNOWN_MINOR,
            removed: None,
        }
    }

    const fn since(name: &'static str, added: u32) -> Self {
        Self {
            name,
            added,
            removed: None,
        }
    }

    const fn until(name: &'static str, removed: u32) -> Self {
        Self {
            name,
            added: OLDEST_KNOWN_MINOR,
            removed: Some(removed),
        }
    }

    /// Whether the module ships with the given runtime version.
    pub fn available_in(&self, version: PythonVersion) -> bool {
        if version.major != 3 {
            return false;
        }
        version.minor >= self.added && self.removed.is_none_or(|removed| version.minor < removed)
    }
}

/// Modules compiled into the interpreter binary. They resolve without a
/// file on disk.
const BUILTIN_MODULES: &[&str] = &[
    "_abc",
    "_codecs",
    "_collections",
    "_frozen_importlib",
    "_frozen_importlib_external",
    "_functools",
    "_imp",
    "_io",
    "_locale",
    "_operator",
    "_signal",
    "_sre",
    "_stat",
    "_string",
    "_symtable",
    "_thread",
    "_tracemalloc",
    "_warnings",
    "_weakref",
    "atexit",
    "builtins",
    "errno",
    "faulthandler",
    "gc",
    "itertools",
    "marshal",
    "posix",
    "pwd",
    "sys",
    "time",
    "xxsubtype",
];

const STDLIB_MODULES: &[StdlibModule] = &[
    StdlibModule::always("__future__"),
    StdlibModule::always("__main__"),
    StdlibModule::always("_ast"),
    StdlibModule::always("_asyncio"),
    StdlibModule::always("_collections_abc"),
    StdlibModule::always("_compat_pickle"),
    StdlibModule::always("_ctypes"),
    StdlibModule::until("_dummy_thread", 9),
    StdlibModule::always("_json"),
    StdlibModule::always("_pydecimal"),
    StdlibModule::always("_pyio"),
    StdlibModule::always("_socket"),
    StdlibModule::always("_ssl"),
    StdlibModule::always("_strptime"),
    StdlibModule::always("_threading_local"),
    StdlibModule::always("abc"),
    StdlibModule::until("aifc", 13),
    StdlibModule::since("annotationlib", 14),
    StdlibModule::always("antigravity"),
    StdlibModule::always("argparse"),
    StdlibModule::always("array"),
    StdlibModule::always("ast"),
    StdlibModule::until("asynchat", 12),
    StdlibModule::always("asyncio"),
    StdlibModule::until("asyncore", 12),
    StdlibModule::until("audioop", 13),
    StdlibModule::always("base64"),
    StdlibModule::always("bdb"),
    StdlibModule::always("binascii"),
    StdlibModule::until("binhex", 11),
    StdlibModule::always("bisect"),
    StdlibModule::always("bz2"),
    StdlibModule::always("cProfile"),
    StdlibModule::always("calendar"),
    StdlibModule::until("cgi", 13),
    StdlibModule::until("cgitb", 13),
    StdlibModule::until("chunk", 13),
    StdlibModule::always("cmath"),
    StdlibModule::always("cmd"),
    StdlibModule::always("code"),
    StdlibModule::always("codecs"),
    StdlibModule::always("codeop"),
    StdlibModule::always("collections"),
    StdlibModule::always("colorsys"),
    StdlibModule::always("compileall"),
    StdlibModule::since("compression", 14),
    StdlibModule::always("concurrent"),
    StdlibModule::always("configparser"),
    StdlibModule::always("contextlib"),
    StdlibModule::always("contextvars"),
    StdlibModule::always("copy"),
    StdlibModule::always("copyreg"),
    StdlibModule::until("crypt", 13),
    StdlibModule::always("csv"),
    StdlibModule::always("ctypes"),
    StdlibModule::always("curses"),
    StdlibModule::always("dataclasses"),
    StdlibModule::always("datetime"),
    StdlibModule::always("dbm"),
    StdlibModule::always("decimal"),
    StdlibModule::always("difflib"),
    StdlibModule::always("dis"),
    StdlibModule::until("distutils", 12),
    StdlibModule::always("doctest"),
    StdlibModule::until("dummy_threading", 9),
    StdlibModule::always("email"),
    StdlibModule::always("encodings"),
    StdlibModule::always("ensurepip"),
    StdlibModule::always("enum"),
    StdlibModule::always("fcntl"),
    StdlibModule::always("filecmp"),
    StdlibModule::always("fileinput"),
    StdlibModule::always("fnmatch"),
    StdlibModule::until("formatter", 10),
    StdlibModule::always("fractions"),
    StdlibModule::always("ftplib"),
    StdlibModule::always("functools"),
    StdlibModule::always("genericpath"),
    StdlibModule::always("getopt"),
    StdlibModule::always("getpass"),
    StdlibModule::always("gettext"),
    StdlibModule::always("glob"),
    StdlibModule::since("graphlib", 9),
    StdlibModule::always("grp"),
    StdlibModule::always("gzip"),
    StdlibModule::always("hashlib"),
    StdlibModule::always("heapq"),
    StdlibModule::always("hmac"),
    StdlibModule::always("html"),
    StdlibModule::always("http"),
    StdlibModule::always("idlelib"),
    StdlibModule::always("imaplib"),
    StdlibModule::until("imghdr", 13),
    StdlibModule::until("imp", 12),
    StdlibModule::always("importlib"),
    StdlibModule::always("inspect"),
    StdlibModule::always("io"),
    StdlibModule::always("ipaddress"),
    StdlibModule::always("json"),
    StdlibModule::always("keyword"),
    StdlibModule::until("lib2to3", 13),
    StdlibModule::always("linecache"),
    StdlibModule::always("locale"),
    StdlibModule::always("logging"),
    StdlibModule::always("lzma"),
    StdlibModule::always("mailbox"),
    StdlibModule::until("mailcap", 13),
    StdlibModule::always("math"),
    StdlibModule::always("mimetypes"),
    StdlibModule::always("mmap"),
    StdlibModule::always("modulefinder"),
    StdlibModule::until("msilib", 13),
    StdlibModule::always("msvcrt"),
    StdlibModule::always("multiprocessing"),
    StdlibModule::always("netrc"),
    StdlibModule::until("nis", 13),
    StdlibModule::until("nntplib", 13),
    StdlibModule::always("nt"),
    StdlibModule::always("ntpath"),
    StdlibModule::always("nturl2path"),
    StdlibModule::always("numbers"),
    StdlibModule::always("opcode"),
    StdlibModule::always("operator"),
    StdlibModule::always("optparse"),
    StdlibModule::always("os"),
    StdlibModule::until("ossaudiodev", 13),
    StdlibModule::until("parser", 10),
    StdlibModule::always("pathlib"),
    StdlibModule::always("pdb"),
    StdlibModule::always("pickle"),
    StdlibModule::always("pickletools"),
    StdlibModule::until("pipes", 13),
    StdlibModule::always("pkgutil"),
    StdlibModule::always("platform"),
    StdlibModule::always("plistlib"),
    StdlibModule::always("poplib"),
    StdlibModule::always("posixpath"),
    StdlibModule::always("pprint"),
    StdlibModule::always("profile"),
    StdlibModule::always("pstats"),
    StdlibModule::always("pty"),
    StdlibModule::always("py_compile"),
    StdlibModule::always("pyclbr"),
    StdlibModule::always("pydoc"),
    StdlibModule::always("pydoc_data"),
    StdlibModule::always("pyexpat"),
    StdlibModule::always("queue"),
    StdlibModule::always("quopri"),
    StdlibModule::always("random"),
    StdlibModule::always("re"),
    StdlibModule::always("readline"),
    StdlibModule::always("reprlib"),
    StdlibModule::always("resource"),
    StdlibModule::always("rlcompleter"),
    StdlibModule::always("runpy"),
    StdlibModule::always("sched"),
    StdlibModule::always("secrets"),
    StdlibModule::always("select"),
    StdlibModule::always("selectors"),
    StdlibModule::always("shelve"),
    StdlibModule::always("shlex"),
    StdlibModule::always("shutil"),
    StdlibModule::always("signal"),
    StdlibModule::always("site"),
    StdlibModule::until("smtpd", 12),
    StdlibModule::always("smtplib"),
    StdlibModule::until("sndhdr", 13),
    StdlibModule::always("socket"),
    StdlibModule::always("socketserver"),
    StdlibModule::until("spwd", 13),
    StdlibModule::always("sqlite3"),
    StdlibModule::always("sre_compile"),
    StdlibModule::always("sre_constants"),
    StdlibModule::always("sre_parse"),
    StdlibModule::always("ssl"),
    StdlibModule::always("stat"),
    StdlibModule::always("statistics"),
    StdlibModule::always("string"),
    StdlibModule::always("stringprep"),
    StdlibModule::always("struct"),
    StdlibModule::always("subprocess"),
    StdlibModule::until("sunau", 13),
    StdlibModule::until("symbol", 10),
    StdlibModule::always("symtable"),
    StdlibModule::always("sysconfig"),
    StdlibModule::always("syslog"),
    StdlibModule::always("tabnanny"),
    StdlibModule::always("tarfile"),
    StdlibModule::until("telnetlib", 13),
    StdlibModule::always("tempfile"),
    StdlibModule::always("termios"),
    StdlibModule::always("textwrap"),
    StdlibModule::always("this"),
    StdlibModule::always("threading"),
    StdlibModule::always("timeit"),
    StdlibModule::always("tkinter"),
    StdlibModule::always("token"),
    StdlibModule::always("tokenize"),
    StdlibModule::since("tomllib", 11),
    StdlibModule::always("trace"),
    StdlibModule::always("traceback"),
    StdlibModule::always("tracemalloc"),
    StdlibModule::always("tty"),
    StdlibModule::always("turtle"),
    StdlibModule::always("turtledemo"),
    StdlibModule::always("types"),
    StdlibModule::always("typing"),
    StdlibModule::always("unicodedata"),
    StdlibModule::always("unittest"),
    StdlibModule::always("urllib"),
    StdlibModule::until("uu", 13),
    StdlibModule::always("uuid"),
    StdlibModule::always("venv"),
    StdlibModule::always("warnings"),
    StdlibModule::always("wave"),
    StdlibModule::always("weakref"),
    StdlibModule::always("webbrowser"),
    StdlibModule::always("winreg"),
    StdlibModule::always("winsound"),
    StdlibModule::always("wsgiref"),
    StdlibModule::until("xdrlib", 13),
    StdlibModule::always("xml"),
    StdlibModule::always("xmlrpc"),
    StdlibModule::always("zipapp"),
    StdlibModule::always("zipfile"),
    StdlibModule::always("zipimport"),
    StdlibModule::always("zlib"),
    StdlibModule::since("zoneinfo", 9),
];

/// Whether `name` is compiled into the interpreter.
pub fn is_builtin_module(name: &str) -> bool {
    BUILTIN_MODULES.contains(&name)
}

/// Whether `name` is a top-level standard-library module of `version`.
pub fn is_stdlib_module(name: &str, version: PythonVersion) -> bool {
    is_builtin_module(name)
        || STDLIB_MODULES
            .iter()
            .any(|module| module.name == name && module.available_in(version))
}

/// Every top-level standard-library module name shipped with `version`.
pub fn stdlib_module_names(version: PythonVersion) -> impl Iterator<Item = &'static str> {
    BUILTIN_MODULES.iter().copied().chain(
        STDLIB_MODULES
            .iter()
            .filter(move |module| module.available_in(version))
            .map(|module| module.name),
    )
}
