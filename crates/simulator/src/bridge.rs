/// Page-side half of [`crate::cdp::CdpPage`].
///
/// Installs `window.__flexDesigner(op, args)` once per document. Elements cross the
/// protocol as indexes into a registry of weak references; a collected or disconnected
/// entry reports `detached`.
pub fn bridge_js() -> &'static str {
    r#"
    if (!window.__flexDesignerInjected) {
        window.__flexDesignerInjected = true;

        const nodes = [];
        const ids = new WeakMap();

        const register = (el) => {
            let id = ids.get(el);
            if (id === undefined) {
                id = nodes.length;
                nodes.push(new WeakRef(el));
                ids.set(el, id);
            }
            return id;
        };

        const node = (id) => {
            const el = nodes[id] && nodes[id].deref();
            if (!el || !el.isConnected) throw { detached: true };
            return el;
        };

        const registry = () => (window.monaco && window.monaco.editor) || null;
        const models = () => {
            const r = registry();
            return (r && typeof r.getModels === 'function' && r.getModels()) || [];
        };
        const views = () => {
            const r = registry();
            return (r && typeof r.getEditors === 'function' && r.getEditors()) || [];
        };
        const model = (i) => {
            const m = models()[i];
            if (!m) throw new Error('no editor model #' + i);
            return m;
        };

        const ops = {
            queryAll: (scope, selector) =>
                Array.from((scope === null ? document : node(scope)).querySelectorAll(selector)).map(register),
            computedStyle: (id) => {
                const s = window.getComputedStyle(node(id));
                return { display: s.display, visibility: s.visibility, opacity: s.opacity || '' };
            },
            textContent: (id) => node(id).textContent || '',
            closest: (id, selector) => {
                const el = node(id).closest(selector);
                return el ? register(el) : null;
            },
            setValue: (id, text) => { node(id).value = text; return null; },
            setTextContent: (id, text) => { node(id).textContent = text; return null; },
            dispatchEvent: (id, type) => { node(id).dispatchEvent(new Event(type, { bubbles: true })); return null; },
            click: (id) => { node(id).click(); return null; },
            editorModels: () => models().map((_, i) => i),
            modelValue: (i) => String(model(i).getValue() ?? ''),
            setModelValue: (i, text) => { model(i).setValue(text); return null; },
            editorViews: () => views().map((_, i) => i),
            touchView: (i) => {
                const v = views()[i];
                if (!v) throw new Error('no editor view #' + i);
                v.trigger('flex-designer', 'type', { text: '' });
                return null;
            },
        };

        window.__flexDesigner = (op, args) => {
            try {
                return { ok: ops[op](...args) };
            } catch (e) {
                if (e && e.detached) return { error: 'detached', detached: true };
                return { error: String((e && e.message) || e) };
            }
        };
    }
    "#
}
