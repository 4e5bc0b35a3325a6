/// A node stored in the document arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Document,
    Doctype(String),
    Element(Element),
    Text(String),
    Comment(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Attribute value: a plain string, or an ordered token list for `class`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Text(String),
    Tokens(Vec<String>),
}

impl AttrValue {
    pub fn to_attr_string(&self) -> String {
        match self {
            AttrValue::Text(text) => text.clone(),
            AttrValue::Tokens(tokens) => tokens.join(" "),
        }
    }
}

const CLASS: &str = "class";

/// An element: tag name plus an ordered attribute bag.
///
/// The `class` attribute is always held as [`AttrValue::Tokens`] and is never
/// stored empty: filtering it down to nothing removes the attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attrs: Vec<(String, AttrValue)>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
            attrs: Vec::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    pub fn is_any(&self, names: &[&str]) -> bool {
        names.contains(&self.name.as_str())
    }

    /// Heading level for `h1`..`h6`.
    pub fn heading_level(&self) -> Option<u8> {
        let digit = self.name.strip_prefix('h')?;
        match digit.parse::<u8>() {
            Ok(level @ 1..=6) => Some(level),
            _ => None,
        }
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.attrs.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn attr_names(&self) -> Vec<String> {
        self.attrs.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(key, _)| key == name)
    }

    /// Scalar value of an attribute. Token-list attributes are read through
    /// [`Element::classes`].
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find_map(|(key, value)| match value {
            AttrValue::Text(text) if key == name => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        if name == CLASS {
            let tokens = value.split_whitespace().map(str::to_string).collect();
            self.set_classes(tokens);
            return;
        }
        self.put(name, AttrValue::Text(value));
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<AttrValue> {
        let index = self.attrs.iter().position(|(key, _)| key == name)?;
        Some(self.attrs.remove(index).1)
    }

    /// Keeps only the attributes whose name satisfies `keep`.
    pub fn retain_attrs(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.attrs.retain(|(name, _)| keep(name.as_str()));
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn classes(&self) -> &[String] {
        self.attrs
            .iter()
            .find_map(|(key, value)| match value {
                AttrValue::Tokens(tokens) if key == CLASS => Some(tokens.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().iter().any(|token| token == class)
    }

    /// Replaces the class list; an empty list deletes the attribute.
    pub fn set_classes(&mut self, tokens: Vec<String>) {
        if tokens.is_empty() {
            self.remove_attr(CLASS);
        } else {
            self.put(CLASS.to_string(), AttrValue::Tokens(tokens));
        }
    }

    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let mut tokens = self.classes().to_vec();
        tokens.push(class.to_string());
        self.set_classes(tokens);
    }

    pub fn retain_classes(&mut self, mut keep: impl FnMut(&str) -> bool) {
        if !self.has_attr(CLASS) {
            return;
        }
        let tokens = self
            .classes()
            .iter()
            .filter(|token| keep(token.as_str()))
            .cloned()
            .collect();
        self.set_classes(tokens);
    }

    fn put(&mut self, name: String, value: AttrValue) {
        match self.attrs.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }
}
