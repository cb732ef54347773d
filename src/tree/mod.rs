mod trie;

use std::io;
use std::io::prelude::*;
use std::path::Path;

use crate::dump::{self, Coroutine};

use self::trie::{SuffixTrie, Visit};

/// Renders coroutines as a tree of shared stack suffixes.
///
/// Coroutines that end in the same outermost frames are printed once under a header naming all
/// of their states:
///
/// ```text
/// 2 Coroutines RUNNING, SUSPENDED,
/// 	com.example.MainKt.main
/// 	kotlinx.coroutines.BuildersKt.runBlocking
/// 	1 Coroutine RUNNING,
/// 		com.example.Worker.compute
/// 	1 Coroutine SUSPENDED,
/// 		kotlinx.coroutines.DelayKt.delay
/// ```
///
/// Each header is followed by the frames its coroutines share past the enclosing group, one tab
/// deeper than the header. Where the coroutines of a group go different ways, a nested header
/// opens for each branch. Coroutines without any frames are grouped first, under a header with
/// no frame lines.
///
/// The output depends only on the coroutines and their order, so rendering the same input twice
/// gives identical text.
pub fn render(coroutines: &[Coroutine]) -> String {
    if coroutines.is_empty() {
        warn!("No coroutines to render");
        return String::new();
    }

    let trie = SuffixTrie::build(coroutines);
    debug!(
        "Built suffix trie with {} nodes for {} coroutines",
        trie.len(),
        coroutines.len()
    );

    let mut layout = Layout::new(coroutines);
    for visit in trie.preorder() {
        layout.visit(visit);
    }
    layout.out
}

/// Renders coroutines as with [`render`] and writes the result to `writer`.
pub fn write_tree<W>(coroutines: &[Coroutine], mut writer: W) -> io::Result<()>
where
    W: Write,
{
    writer.write_all(render(coroutines).as_bytes())?;
    writer.flush()
}

/// Parses a dump from `reader` and writes its rendered tree to `writer`.
///
/// See [`dump::from_reader`] for the input format and [`render`] for the output.
pub fn from_reader<R, W>(reader: R, writer: W) -> io::Result<()>
where
    R: BufRead,
    W: Write,
{
    let coroutines = dump::from_reader(reader)?;
    write_tree(&coroutines, writer)
}

/// Parses the dump in a file (or on STDIN if `infile` is `None`) and writes its rendered tree
/// to `writer`.
pub fn from_file<P, W>(infile: Option<P>, writer: W) -> io::Result<()>
where
    P: AsRef<Path>,
    W: Write,
{
    let coroutines = dump::from_file(infile)?;
    write_tree(&coroutines, writer)
}

/// Traversal state carried from one trie node to the next.
struct Layout<'t> {
    coroutines: &'t [Coroutine],

    /// Label lists of the groups whose headers are open, innermost last.
    groups: Vec<&'t [usize]>,

    /// Indentation levels opened for nested groups. The outermost open group has none.
    indents: usize,

    out: String,
}

impl<'t> Layout<'t> {
    fn new(coroutines: &'t [Coroutine]) -> Self {
        Layout {
            coroutines,
            groups: Vec::new(),
            indents: 0,
            out: String::new(),
        }
    }

    fn visit(&mut self, visit: Visit<'t, 't>) {
        let labels = visit.labels;
        if labels.is_empty() {
            return;
        }

        // Close the groups this node has no coroutine in common with.
        while let Some(top) = self.groups.last() {
            if shares_any(top, labels) {
                break;
            }
            self.groups.pop();
            self.indents = self.indents.saturating_sub(1);
        }

        let continues_top = self.groups.last() == Some(&labels);
        if !continues_top {
            if !self.groups.is_empty() {
                self.indents += 1;
            }
            self.write_header(labels);
            self.groups.push(labels);
        }

        if let Some(frame) = visit.frame {
            self.indent(self.indents + 1);
            self.out.push_str(frame);
            self.out.push('\n');
        }
    }

    fn write_header(&mut self, labels: &[usize]) {
        self.indent(self.indents);
        let mut count = itoa::Buffer::new();
        self.out.push_str(count.format(labels.len()));
        self.out.push_str(" Coroutine");
        if labels.len() > 1 {
            self.out.push('s');
        }
        for &label in labels {
            self.out.push(' ');
            self.out.push_str(&self.coroutines[label].state);
            self.out.push(',');
        }
        self.out.push('\n');
    }

    fn indent(&mut self, depth: usize) {
        self.out.extend(std::iter::repeat('\t').take(depth));
    }
}

// Both lists are ascending.
fn shares_any(a: &[usize], b: &[usize]) -> bool {
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => return true,
        }
    }
    false
}
