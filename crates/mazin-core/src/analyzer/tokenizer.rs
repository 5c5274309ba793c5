use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, error, info};

use super::feature::{is_maze_feature, maze_adjustment};
use super::lattice::Lattice;
use super::node::{NodeId, NodeKind};
use super::AnalyzeError;
use crate::dict::builder::{CHAR_PROPERTY_FILE, SYS_DIC_FILE, UNK_DIC_FILE};
use crate::dict::char_property::SPACE_CATEGORY;
use crate::dict::{CharInfo, CharProperty, DictError, DictType, Dictionary, Token};
use crate::settings::Settings;

/// The system dictionary followed by user dictionaries in load order.
#[derive(Debug)]
pub struct DictionarySet {
    system: Arc<Dictionary>,
    users: Vec<Arc<Dictionary>>,
}

impl DictionarySet {
    fn system_only(system: Arc<Dictionary>) -> Self {
        Self {
            system,
            users: Vec::new(),
        }
    }

    pub fn system(&self) -> &Dictionary {
        &self.system
    }

    pub fn users(&self) -> &[Arc<Dictionary>] {
        &self.users
    }

    /// All dictionaries, system first.
    pub fn iter(&self) -> impl Iterator<Item = &Dictionary> {
        std::iter::once(self.system.as_ref()).chain(self.users.iter().map(|d| d.as_ref()))
    }

    pub fn len(&self) -> usize {
        1 + self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Dictionary lookup plus unknown-word synthesis.
#[derive(Debug)]
pub struct Tokenizer {
    dictionaries: RwLock<Arc<DictionarySet>>,
    unknown: Dictionary,
    char_property: CharProperty,
    /// Unknown-word tokens indexed by category id.
    unk_tokens: Vec<Vec<Token>>,
    space: CharInfo,
    max_grouping_size: usize,
}

impl Tokenizer {
    pub fn new(
        system: Dictionary,
        unknown: Dictionary,
        char_property: CharProperty,
        max_grouping_size: usize,
    ) -> Result<Self, AnalyzeError> {
        if system.dic_type() != DictType::System {
            return Err(DictError::WrongType {
                expected: DictType::System,
                found: system.dic_type(),
            }
            .into());
        }
        let space = char_property
            .category_info(SPACE_CATEGORY)
            .ok_or_else(|| DictError::MissingCategory(SPACE_CATEGORY.to_string()))?;

        let mut unk_tokens = Vec::with_capacity(char_property.len());
        for id in 0..char_property.len() {
            let name = char_property.category_name(id).unwrap_or_default();
            let tokens = unknown.exact_match(name);
            if tokens.is_empty() {
                return Err(DictError::MissingCategory(name.to_string()).into());
            }
            unk_tokens.push(tokens.to_vec());
        }

        Ok(Self {
            dictionaries: RwLock::new(Arc::new(DictionarySet::system_only(Arc::new(system)))),
            unknown,
            char_property,
            unk_tokens,
            space,
            max_grouping_size: max_grouping_size.max(1),
        })
    }

    /// Open `sys.dic`, `unk.dic` and `char.bin` under `dicdir`, then load the
    /// configured user dictionaries.
    pub fn open(dicdir: &Path, settings: &Settings) -> Result<Self, AnalyzeError> {
        let unknown = Dictionary::open_as(&dicdir.join(UNK_DIC_FILE), DictType::Unknown)?;
        let char_property = CharProperty::open(&dicdir.join(CHAR_PROPERTY_FILE))?;
        let mut system = Dictionary::open_as(&dicdir.join(SYS_DIC_FILE), DictType::System)?;
        system.set_non_terminal_cost(settings.dictionary.non_terminal_cost);

        let tokenizer = Self::new(
            system,
            unknown,
            char_property,
            settings.unknown.max_grouping_size,
        )?;
        tokenizer.reload(&settings.dictionary.userdic);
        Ok(tokenizer)
    }

    /// The dictionary set in effect; held for the length of one analysis.
    pub fn snapshot(&self) -> Arc<DictionarySet> {
        let guard = self
            .dictionaries
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    fn swap(&self, set: DictionarySet) {
        let mut guard = self
            .dictionaries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(set);
    }

    pub fn char_property(&self) -> &CharProperty {
        &self.char_property
    }

    /// Drop every user dictionary.
    pub fn reset(&self) {
        let system = Arc::clone(&self.snapshot().system);
        self.swap(DictionarySet::system_only(system));
        info!("user dictionaries reset");
    }

    /// Replace the user dictionaries with the comma-separated files in
    /// `userdic`. Files that fail to load are logged and skipped. Returns the
    /// number of dictionaries loaded.
    pub fn reload(&self, userdic: &str) -> usize {
        let system = Arc::clone(&self.snapshot().system);
        let mut set = DictionarySet::system_only(Arc::clone(&system));

        for fname in userdic.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            match load_user_dictionary(Path::new(fname), &system) {
                Ok(dict) => set.users.push(Arc::new(dict)),
                Err(e) => error!(path = fname, error = %e, "cannot open user dictionary"),
            }
        }

        let loaded = set.users.len();
        self.swap(set);
        info!(loaded, "user dictionaries reloaded");
        loaded
    }

    /// Append an already built user dictionary.
    pub fn add_user_dictionary(&self, mut dict: Dictionary) -> Result<(), AnalyzeError> {
        let current = self.snapshot();
        check_user_dictionary(&dict, &current.system)?;
        dict.set_non_terminal_cost(current.system.non_terminal_cost());
        let mut users = current.users.clone();
        users.push(Arc::new(dict));
        self.swap(DictionarySet {
            system: Arc::clone(&current.system),
            users,
        });
        Ok(())
    }

    /// Lookup against the current dictionary set.
    pub fn lookup(
        &self,
        lattice: &mut Lattice,
        pos: usize,
        maze_penalty: i32,
        allow_non_terminal: bool,
    ) -> Vec<NodeId> {
        let dics = self.snapshot();
        self.lookup_in(&dics, lattice, pos, maze_penalty, allow_non_terminal)
    }

    /// Candidate nodes whose lattice range starts at `pos`.
    ///
    /// Leading whitespace is skipped; the nodes' surfaces start after it.
    /// Unknown words are proposed when no dictionary matched or the
    /// character class always invokes them. Empty only when nothing but
    /// whitespace remains.
    pub fn lookup_in(
        &self,
        dics: &DictionarySet,
        lattice: &mut Lattice,
        pos: usize,
        maze_penalty: i32,
        allow_non_terminal: bool,
    ) -> Vec<NodeId> {
        let start = self
            .char_property
            .seek_to_other_type(lattice.sentence(), pos, self.space);
        if start >= lattice.len() {
            return Vec::new();
        }
        let cinfo = self.char_property.char_info(lattice.sentence()[start]);
        let mut nodes = Vec::new();

        for dic in dics.iter() {
            let rest = lattice.sentence()[start..].iter().copied();
            for m in dic.common_prefix_search(rest, allow_non_terminal) {
                for token in m.tokens {
                    let node = NewNode {
                        begin: pos,
                        start,
                        end: start + m.length,
                        token,
                        feature: dic.feature(token),
                        kind: NodeKind::Normal,
                        char_type: cinfo.primary,
                    };
                    nodes.push(node.add_to(lattice, maze_penalty));
                }
            }
        }

        if nodes.is_empty() || cinfo.invoke {
            let tokens = self
                .unk_tokens
                .get(cinfo.primary as usize)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            for len in self.unknown_lengths(lattice.sentence(), start, cinfo) {
                for token in tokens {
                    let node = NewNode {
                        begin: pos,
                        start,
                        end: start + len,
                        token,
                        feature: self.unknown.feature(token),
                        kind: NodeKind::Unknown,
                        char_type: cinfo.primary,
                    };
                    nodes.push(node.add_to(lattice, maze_penalty));
                }
            }
        }

        debug!(pos, start, nodes = nodes.len(), "lookup");
        nodes.reverse();
        nodes
    }

    /// Surface lengths proposed for an unknown word at `start`.
    fn unknown_lengths(&self, chars: &[char], start: usize, cinfo: CharInfo) -> Vec<usize> {
        let other = self
            .char_property
            .seek_to_other_type(chars, start, cinfo.primarize());
        let maxlen = (other - start).min(self.max_grouping_size);
        let limit = (cinfo.span_limit as usize).min(maxlen);
        let mut lengths: Vec<usize> = (1..=limit).collect();
        if limit < maxlen && cinfo.group {
            lengths.push(maxlen);
        }
        if lengths.is_empty() {
            lengths.push(1);
        }
        lengths
    }
}

struct NewNode<'a> {
    begin: usize,
    start: usize,
    end: usize,
    token: &'a Token,
    feature: &'a str,
    kind: NodeKind,
    char_type: u8,
}

impl NewNode<'_> {
    fn add_to(self, lattice: &mut Lattice, maze_penalty: i32) -> NodeId {
        let id = lattice.new_node(self.begin, self.start, self.end);
        let node = lattice.node_mut(id);
        let mut feature = self.feature.to_string();
        if self.kind == NodeKind::Unknown {
            let surface = &node.surface;
            feature.push_str(&format!(",{surface},{surface},{surface}"));
        }
        node.lc_attr = self.token.lc_attr;
        node.rc_attr = self.token.rc_attr;
        node.kind = self.kind;
        node.char_type = self.char_type;
        node.is_maze = is_maze_feature(&feature);
        let adjustment = maze_adjustment(&feature, node.is_maze, node.length(), maze_penalty);
        node.wcost = self.token.wcost.saturating_add(adjustment);
        node.feature = feature;
        id
    }
}

fn check_user_dictionary(dict: &Dictionary, system: &Dictionary) -> Result<(), DictError> {
    if dict.dic_type() != DictType::User {
        return Err(DictError::WrongType {
            expected: DictType::User,
            found: dict.dic_type(),
        });
    }
    if !system.is_compatible(dict) {
        return Err(DictError::Incompatible(format!(
            "{} (version {}, {}x{}) does not match the system dictionary (version {}, {}x{})",
            dict.filename(),
            dict.version(),
            dict.lsize(),
            dict.rsize(),
            system.version(),
            system.lsize(),
            system.rsize()
        )));
    }
    Ok(())
}

fn load_user_dictionary(path: &Path, system: &Dictionary) -> Result<Dictionary, DictError> {
    let mut dict = Dictionary::open(path)?;
    check_user_dictionary(&dict, system)?;
    dict.set_non_terminal_cost(system.non_terminal_cost());
    Ok(dict)
}
