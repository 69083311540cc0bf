//! Renders a compilation unit into source text.
//!
//! The assembler walks the unit section by section (package, imports,
//! static imports, body) and descends recursively into type bodies. It only
//! reads the model, so rendering the same model twice yields identical text.

use crate::error::ModelError;
use crate::members::{Comments, Constructor, Field, Initializer, Method, Parameter};
use crate::model::{CodeModel, DeclId, DeclarationKind, Owner, UnitId};
use crate::modifiers::Modifiers;
use crate::type_def::{TypeDefinition, TypeKind};
use crate::types::TypeDescriptor;
use crate::utils;
use log::trace;
use std::sync::Arc;

/// One indentation step per nesting level.
pub const INDENT: &str = "\t";

/// The syntactic category the writer is currently emitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Start,
    Package,
    Import,
    StaticImport,
    TypeHeader,
    Field,
    Member,
    Comment,
}

struct SourceWriter {
    out: String,
    section: Section,
}

impl SourceWriter {
    fn new() -> Self {
        SourceWriter {
            out: String::new(),
            section: Section::Start,
        }
    }

    fn enter(&mut self, section: Section) {
        if self.section != section {
            trace!("assembler: {:?} -> {:?}", self.section, section);
            self.section = section;
        }
    }

    fn line(&mut self, level: usize, text: &str) {
        if !text.is_empty() {
            for _ in 0..level {
                self.out.push_str(INDENT);
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }
}

/// Stateless renderer from a [`CodeModel`] compilation unit to text.
#[derive(Debug, Default, Clone, Copy)]
pub struct Assembler;

impl Assembler {
    #[must_use]
    pub fn new() -> Self {
        Assembler
    }

    /// Renders every section of `unit`.
    ///
    /// # Errors
    /// Returns `UnknownDeclaration` if the unit or one of its declarations
    /// is not part of `model`.
    pub fn generate(&self, model: &CodeModel, unit: UnitId) -> Result<String, ModelError> {
        let compilation_unit = model.unit(unit)?;
        let mut w = SourceWriter::new();

        if let Some(package) = compilation_unit.package() {
            w.enter(Section::Package);
            if let DeclarationKind::Package(p) = model.declaration(package)?.kind() {
                w.line(0, &format!("package {};", p.name()));
                w.blank();
            }
        }

        if !compilation_unit.imports().is_empty() {
            w.enter(Section::Import);
            for &import in compilation_unit.imports() {
                if let DeclarationKind::Import(i) = model.declaration(import)?.kind() {
                    let name = self.import_name(model, i.target())?;
                    w.line(0, &format!("import {name};"));
                }
            }
            w.blank();
        }

        if !compilation_unit.static_imports().is_empty() {
            w.enter(Section::StaticImport);
            for &import in compilation_unit.static_imports() {
                if let DeclarationKind::StaticImport(i) = model.declaration(import)?.kind() {
                    let name = self.import_name(model, i.target())?;
                    w.line(0, &format!("import static {name}.{};", i.member()));
                }
            }
            w.blank();
        }

        w.blank();

        for (index, &ty) in compilation_unit.types().iter().enumerate() {
            if index > 0 {
                w.blank();
            }
            self.write_declaration(&mut w, model, ty, 0)?;
        }

        Ok(w.out)
    }

    /// Renders a single declaration at its own nesting depth, comments
    /// included.
    ///
    /// # Errors
    /// Returns `DetachedDeclaration` for a constructor without an owning type.
    pub fn render_declaration(&self, model: &CodeModel, id: DeclId) -> Result<String, ModelError> {
        model.declaration(id)?;
        let level = model.nesting_level(id);
        let mut w = SourceWriter::new();
        self.write_declaration(&mut w, model, id, level)?;
        Ok(w.out)
    }

    fn write_declaration(
        &self,
        w: &mut SourceWriter,
        model: &CodeModel,
        id: DeclId,
        level: usize,
    ) -> Result<(), ModelError> {
        let declaration = model.declaration(id)?;
        self.write_comments(w, declaration.comments(), level);
        match declaration.kind() {
            DeclarationKind::Field(f) => self.write_field(w, f, level),
            DeclarationKind::Method(m) => {
                let in_interface = self.owner_kind(model, id)? == Some(TypeKind::Interface);
                self.write_method(w, m, in_interface, level);
            }
            DeclarationKind::Constructor(c) => {
                let owner = match model.owner(id) {
                    Some(Owner::Type(owner)) => owner,
                    _ => return Err(ModelError::DetachedDeclaration(model.describe(id))),
                };
                let name = model.type_def(owner)?.name().to_string();
                self.write_constructor(w, c, &name, level);
            }
            DeclarationKind::Initializer(i) => self.write_initializer(w, i, false, level),
            DeclarationKind::StaticInitializer(i) => self.write_initializer(w, i, true, level),
            DeclarationKind::Type(t) => self.write_type(w, model, t, level)?,
            DeclarationKind::Package(p) => {
                w.enter(Section::Package);
                w.line(level, &format!("package {};", p.name()));
            }
            DeclarationKind::Import(i) => {
                w.enter(Section::Import);
                let name = self.import_name(model, i.target())?;
                w.line(level, &format!("import {name};"));
            }
            DeclarationKind::StaticImport(i) => {
                w.enter(Section::StaticImport);
                let name = self.import_name(model, i.target())?;
                w.line(level, &format!("import static {name}.{};", i.member()));
            }
        }
        Ok(())
    }

    fn write_comments(&self, w: &mut SourceWriter, comments: &Comments, level: usize) {
        if comments.is_empty() {
            return;
        }
        w.enter(Section::Comment);
        if let Some(doc) = &comments.doc {
            self.write_comment_block(w, "/**", doc, level);
        }
        if let Some(block) = &comments.block {
            self.write_comment_block(w, "/*", block, level);
        }
        for line in &comments.lines {
            w.line(level, &format!("// {line}"));
        }
    }

    fn write_comment_block(&self, w: &mut SourceWriter, opener: &str, text: &str, level: usize) {
        w.line(level, opener);
        for line in utils::comment_lines(text) {
            if line.is_empty() {
                w.line(level, " *");
            } else {
                w.line(level, &format!(" * {line}"));
            }
        }
        w.line(level, " */");
    }

    fn write_type(
        &self,
        w: &mut SourceWriter,
        model: &CodeModel,
        t: &TypeDefinition,
        level: usize,
    ) -> Result<(), ModelError> {
        w.enter(Section::TypeHeader);
        let mut header = format!("{}{} {}", t.modifiers().to_prefix(), t.kind(), t.name());
        match t.kind() {
            TypeKind::Class => {
                if let Some(superclass) = t.superclass() {
                    header.push_str(&format!(" extends {}", superclass.simple_name()));
                }
                if !t.super_interfaces().is_empty() {
                    header.push_str(&format!(" implements {}", type_list(t.super_interfaces())));
                }
            }
            TypeKind::Interface => {
                if !t.super_interfaces().is_empty() {
                    header.push_str(&format!(" extends {}", type_list(t.super_interfaces())));
                }
            }
        }
        header.push_str(" {");
        w.line(level, &header);

        let mut previous: Option<Section> = None;
        for &member in t.members() {
            let section = match model.declaration(member)?.kind() {
                DeclarationKind::Field(_) => Section::Field,
                _ => Section::Member,
            };
            if let Some(previous) = previous {
                if !(previous == Section::Field && section == Section::Field) {
                    w.blank();
                }
            }
            self.write_declaration(w, model, member, level + 1)?;
            previous = Some(section);
        }

        w.enter(Section::TypeHeader);
        w.line(level, "}");
        Ok(())
    }

    fn write_field(&self, w: &mut SourceWriter, f: &Field, level: usize) {
        w.enter(Section::Field);
        let mut text = format!("{}{} {}", f.modifiers().to_prefix(), f.ty().simple_name(), f.name());
        if let Some(value) = f.initializer() {
            text.push_str(&format!(" = {value}"));
        }
        text.push(';');
        w.line(level, &text);
    }

    fn write_method(&self, w: &mut SourceWriter, m: &Method, in_interface: bool, level: usize) {
        w.enter(Section::Member);
        let signature = format!(
            "{}{} {}({}){}",
            m.modifiers().to_prefix(),
            m.return_type().simple_name(),
            m.name(),
            parameter_list(m.parameters()),
            throws_clause(m.thrown()),
        );
        match m.body_lines() {
            Some(body) => self.write_block(w, &signature, body, level),
            None if in_interface
                || m.modifiers()
                    .intersects(Modifiers::ABSTRACT | Modifiers::NATIVE) =>
            {
                w.line(level, &format!("{signature};"));
            }
            None => self.write_block(w, &signature, &[], level),
        }
    }

    fn write_constructor(&self, w: &mut SourceWriter, c: &Constructor, name: &str, level: usize) {
        w.enter(Section::Member);
        let signature = format!(
            "{}{}({}){}",
            c.modifiers().to_prefix(),
            name,
            parameter_list(c.parameters()),
            throws_clause(c.thrown()),
        );
        self.write_block(w, &signature, c.body_lines(), level);
    }

    fn write_initializer(&self, w: &mut SourceWriter, i: &Initializer, is_static: bool, level: usize) {
        w.enter(Section::Member);
        let opener = if is_static { "static" } else { "" };
        self.write_block(w, opener, i.body_lines(), level);
    }

    /// `head {`, the body one level deeper, then `}`.
    fn write_block(&self, w: &mut SourceWriter, head: &str, body: &[String], level: usize) {
        if head.is_empty() {
            w.line(level, "{");
        } else {
            w.line(level, &format!("{head} {{"));
        }
        for statement in body {
            for line in statement.lines() {
                w.line(level + 1, line);
            }
        }
        w.line(level, "}");
    }

    fn owner_kind(&self, model: &CodeModel, id: DeclId) -> Result<Option<TypeKind>, ModelError> {
        match model.owner(id) {
            Some(Owner::Type(owner)) => Ok(Some(model.type_def(owner)?.kind())),
            _ => Ok(None),
        }
    }

    fn import_name(&self, model: &CodeModel, target: &TypeDescriptor) -> Result<String, ModelError> {
        match target {
            TypeDescriptor::Defined(d) => model.qualified_name(d.decl),
            other => Ok(other.to_string()),
        }
    }
}

fn type_list(types: &[Arc<TypeDescriptor>]) -> String {
    types
        .iter()
        .map(|t| t.simple_name())
        .collect::<Vec<_>>()
        .join(", ")
}

fn parameter_list(parameters: &[Parameter]) -> String {
    parameters
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn throws_clause(thrown: &[Arc<TypeDescriptor>]) -> String {
    if thrown.is_empty() {
        String::new()
    } else {
        format!(" throws {}", type_list(thrown))
    }
}
